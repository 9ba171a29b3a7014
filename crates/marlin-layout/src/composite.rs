//! Chains several layouts into one.

use crate::base::Layout;
use marlin_model::cell::CellId;
use marlin_model::graph::Graph;

/// Runs member layouts in order inside a single update batch. Interactive `move_cell`
/// notifications are forwarded to the designated master (the first layout by default).
pub struct CompositeLayout {
    pub layouts: Vec<Box<dyn Layout>>,
    pub master: Option<usize>,
}

impl CompositeLayout {
    pub fn new(layouts: Vec<Box<dyn Layout>>) -> Self {
        Self {
            layouts,
            master: None,
        }
    }
}

impl Layout for CompositeLayout {
    fn execute(&mut self, graph: &mut Graph, parent: CellId) {
        graph.begin_update();
        for layout in &mut self.layouts {
            layout.execute(graph, parent);
        }
        graph.end_update();
    }

    fn move_cell(&mut self, graph: &mut Graph, cell: CellId, x: f64, y: f64) {
        let index = self.master.unwrap_or(0);
        if let Some(layout) = self.layouts.get_mut(index) {
            layout.move_cell(graph, cell, x, y);
        }
    }
}
