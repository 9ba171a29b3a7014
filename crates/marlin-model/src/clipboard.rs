//! Copy/cut/paste over a graph.
//!
//! The clipboard is an explicit session object, not process-wide state; callers hold one
//! per editing context. Copied cells are cloned into the graph's arena and parked detached
//! until pasted, so repeated pastes keep cloning from the same snapshot.

use crate::cell::CellId;
use crate::graph::Graph;
use crate::topology;

#[derive(Debug)]
pub struct Clipboard {
    cells: Vec<CellId>,
    insert_count: u32,
    /// Offset applied per paste, in pixels per step.
    pub step_size: f64,
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            insert_count: 1,
            step_size: 10.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// Copies the given cells (or the current selection), reduced to their topmost roots and
    /// filtered to exportable cells. Returns the originals that were copied.
    pub fn copy(&mut self, graph: &mut Graph, cells: Option<&[CellId]>) -> Vec<CellId> {
        let cells = match cells {
            Some(cells) => cells.to_vec(),
            None => graph.selection_cells().to_vec(),
        };
        let result = graph.exportable_cells(&topology::topmost_cells(&graph.model, &cells));
        self.insert_count = 1;
        self.cells = graph.clone_cells(&result);
        result
    }

    /// Copies, then deletes the originals. The first paste after a cut lands exactly at the
    /// cut location.
    pub fn cut(&mut self, graph: &mut Graph, cells: Option<&[CellId]>) -> Vec<CellId> {
        let cells = self.copy(graph, cells);
        self.insert_count = 0;
        graph.remove_cells(Some(cells.clone()), true);
        cells
    }

    /// Inserts clones of the clipboard contents into the graph's default parent, offset by
    /// `insert_count * step_size` so repeated pastes stagger instead of overlapping. The
    /// pasted cells become the selection.
    pub fn paste(&mut self, graph: &mut Graph) -> Vec<CellId> {
        if self.cells.is_empty() {
            return Vec::new();
        }
        let cells = graph.importable_cells(&self.cells);
        let delta = f64::from(self.insert_count) * self.step_size;
        let parent = graph.default_parent();
        let pasted = graph.move_cells(&cells, delta, delta, true, Some(parent), None);
        self.insert_count += 1;
        graph.set_selection_cells(pasted.clone());
        pasted
    }
}
