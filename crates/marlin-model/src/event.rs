//! Change notifications.
//!
//! Every completed top-level mutation on a [`Graph`](crate::Graph) fires exactly one event
//! describing the change. Dispatch, coalescing across a begin/end batch and undo recording
//! are the sink's concern; the model only guarantees the one-event-per-operation contract.

use crate::cell::CellId;
use crate::geometry::{Geometry, Rect};
use crate::graph::Align;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    CellsAdded {
        cells: Vec<CellId>,
        parent: CellId,
        index: usize,
        source: Option<CellId>,
        target: Option<CellId>,
        absolute: bool,
    },
    CellsRemoved {
        cells: Vec<CellId>,
    },
    CellsMoved {
        cells: Vec<CellId>,
        dx: f64,
        dy: f64,
        disconnect: bool,
    },
    CellsResized {
        cells: Vec<CellId>,
        bounds: Vec<Rect>,
        previous: Vec<Option<Geometry>>,
    },
    CellsToggled {
        cells: Vec<CellId>,
        show: bool,
    },
    CellsFolded {
        cells: Vec<CellId>,
        collapse: bool,
    },
    CellsOrdered {
        cells: Vec<CellId>,
        back: bool,
    },
    CellsAligned {
        cells: Vec<CellId>,
        align: Align,
    },
    CellSizeUpdated {
        cell: CellId,
    },
    StyleChanged {
        cells: Vec<CellId>,
    },
}

pub trait EventSink {
    fn fire(&mut self, event: &GraphEvent);
}
