//! Injected collaborator contracts: style resolution and rendered view state.
//!
//! The model is headless. Where an operation is specified against rendered state (routed
//! edge points, label bounding boxes, screen origins), the mutation engine consults an
//! optional [`View`] and otherwise falls back to deterministic geometry-derived values.

use crate::cell::CellId;
use crate::geometry::{Point, Rect};
use crate::model::Model;
use crate::style::Style;

/// Resolves the effective style for a cell. Stylesheet cascades live outside this crate;
/// the default resolver returns the cell's own style map unchanged.
pub trait StyleResolver {
    fn resolve(&self, model: &Model, cell: CellId) -> Style;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CellStyleResolver;

impl StyleResolver for CellStyleResolver {
    fn resolve(&self, model: &Model, cell: CellId) -> Style {
        model.style(cell).clone()
    }
}

/// Rendered state of a cell as known to an external view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellState {
    /// Absolute screen bounds.
    pub bounds: Rect,
    /// Label bounding box when the text overflows the cell.
    pub label_bounds: Option<Rect>,
    /// Routed edge points, absolute, including the endpoints.
    pub absolute_points: Vec<Point>,
}

pub trait View {
    /// Rendered state for a cell, `None` while the cell is not displayed.
    fn state(&self, model: &Model, cell: CellId) -> Option<CellState>;

    fn scale(&self) -> f64 {
        1.0
    }

    fn translate(&self) -> Point {
        Point::ZERO
    }
}
