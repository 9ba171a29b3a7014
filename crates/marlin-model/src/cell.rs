//! The cell entity: one type for vertices, edges and plain containers, tagged by flags.

use crate::geometry::Geometry;
use crate::style::Style;
use serde::{Deserialize, Serialize};

/// Stable arena handle for a cell. Identity comparisons between cells are comparisons
/// between these handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub(crate) u32);

impl CellId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node, edge or container in the diagram. Structural links (parent/children) and graph
/// links (source/target/edges) are independent of each other; both are maintained by
/// [`Model`](crate::Model), which owns all cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Optional external identifier. The model itself does not enforce uniqueness.
    pub id: Option<String>,
    /// Opaque payload; the model carries it but attaches no meaning to it.
    pub value: Option<serde_json::Value>,
    pub geometry: Option<Geometry>,
    pub style: Style,
    pub vertex: bool,
    pub edge: bool,
    pub connectable: bool,
    pub visible: bool,
    pub collapsed: bool,
    pub(crate) parent: Option<CellId>,
    pub(crate) children: Vec<CellId>,
    pub(crate) source: Option<CellId>,
    pub(crate) target: Option<CellId>,
    /// Reverse index of incident edges. Authoritative state is each edge's own
    /// source/target; this list mirrors it.
    pub(crate) edges: Vec<CellId>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            id: None,
            value: None,
            geometry: None,
            style: Style::default(),
            vertex: false,
            edge: false,
            connectable: true,
            visible: true,
            collapsed: false,
            parent: None,
            children: Vec::new(),
            source: None,
            target: None,
            edges: Vec::new(),
        }
    }
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    /// A vertex cell with the given geometry.
    pub fn vertex(geometry: Geometry) -> Self {
        Self {
            vertex: true,
            geometry: Some(geometry),
            ..Default::default()
        }
    }

    /// An edge cell with an empty relative route.
    pub fn edge() -> Self {
        let geometry = Geometry {
            relative: true,
            ..Default::default()
        };
        Self {
            edge: true,
            geometry: Some(geometry),
            ..Default::default()
        }
    }

    pub fn parent(&self) -> Option<CellId> {
        self.parent
    }

    pub fn children(&self) -> &[CellId] {
        &self.children
    }

    pub fn source(&self) -> Option<CellId> {
        self.source
    }

    pub fn target(&self) -> Option<CellId> {
        self.target
    }

    pub fn edges(&self) -> &[CellId] {
        &self.edges
    }
}
