//! Fans out edges that share the same terminal pair.

use crate::base::{self, Layout};
use marlin_model::cell::CellId;
use marlin_model::geometry::Point;
use marlin_model::graph::Graph;
use std::collections::BTreeMap;

pub struct ParallelEdgeLayout {
    /// Distance between neighbouring parallel routes.
    pub spacing: f64,
    /// Group by terminal positions as well, so unconnected but coincident pairs fan out too.
    pub check_overlap: bool,
}

impl Default for ParallelEdgeLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelEdgeLayout {
    pub fn new() -> Self {
        Self {
            spacing: 20.0,
            check_overlap: false,
        }
    }

    /// Stable grouping key for an edge, direction-insensitive. `None` for dangling edges.
    fn edge_id(&self, graph: &Graph, edge: CellId) -> Option<String> {
        let src = graph.model.terminal(edge, true)?;
        let trg = graph.model.terminal(edge, false)?;
        let (a, b) = if src.index() <= trg.index() {
            (src, trg)
        } else {
            (trg, src)
        };
        let mut id = format!("{}-{}", a.index(), b.index());
        if self.check_overlap {
            for terminal in [a, b] {
                if let Some(geo) = graph.model.geometry(terminal) {
                    id.push_str(&format!("-{}-{}", geo.x.round(), geo.y.round()));
                }
            }
        }
        Some(id)
    }

    fn find_parallels(&self, graph: &Graph, parent: CellId) -> BTreeMap<String, Vec<CellId>> {
        let mut lookup: BTreeMap<String, Vec<CellId>> = BTreeMap::new();
        for &child in graph.model.children(parent) {
            if !base::is_edge_ignored(graph, child) {
                if let Some(id) = self.edge_id(graph, child) {
                    lookup.entry(id).or_default().push(child);
                }
            }
        }
        lookup
    }

    fn layout_group(&self, graph: &mut Graph, parallels: &[CellId]) {
        let edge = parallels[0];
        let src = graph
            .model
            .terminal(edge, true)
            .and_then(|t| graph.model.geometry(t))
            .map(|g| g.rect());
        let trg = graph
            .model
            .terminal(edge, false)
            .and_then(|t| graph.model.geometry(t))
            .map(|g| g.rect());
        let (Some(src), Some(trg)) = (src, trg) else {
            return;
        };
        if src == trg {
            // Loops fan out to the right of the vertex.
            let mut x0 = src.x + src.width + self.spacing;
            let y0 = src.y + src.height / 2.0;
            for &edge in parallels {
                self.route(graph, edge, x0, y0);
                x0 += self.spacing;
            }
            return;
        }
        let sc = src.center();
        let tc = trg.center();
        let dx = tc.x - sc.x;
        let dy = tc.y - sc.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            return;
        }
        let nx = dy * self.spacing / len;
        let ny = dx * self.spacing / len;
        let mut x0 = sc.x + dx / 2.0 + nx * (parallels.len() - 1) as f64 / 2.0;
        let mut y0 = sc.y + dy / 2.0 - ny * (parallels.len() - 1) as f64 / 2.0;
        for &edge in parallels {
            self.route(graph, edge, x0, y0);
            x0 -= nx;
            y0 += ny;
        }
    }

    fn route(&self, graph: &mut Graph, edge: CellId, x: f64, y: f64) {
        if graph.is_cell_movable(edge) {
            base::set_edge_points(graph, edge, vec![Point::new(x, y)]);
        }
    }
}

impl Layout for ParallelEdgeLayout {
    fn execute(&mut self, graph: &mut Graph, parent: CellId) {
        let lookup = self.find_parallels(graph, parent);
        graph.begin_update();
        for parallels in lookup.values() {
            if !parallels.is_empty() {
                self.layout_group(graph, parallels);
            }
        }
        graph.end_update();
    }
}
