//! Places the children of a parent on a circle.

use crate::base::{self, Layout};
use marlin_model::cell::CellId;
use marlin_model::graph::Graph;
use std::f64::consts::PI;

pub struct CircleLayout {
    /// Lower bound for the circle radius. The radius grows with the vertex count so
    /// neighbours never overlap.
    pub radius: f64,
    /// Use `x0`/`y0` as the top-left of the circle instead of the current vertex extent.
    pub move_circle: bool,
    pub x0: f64,
    pub y0: f64,
    pub reset_edges: bool,
    pub disable_edge_style: bool,
}

impl Default for CircleLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl CircleLayout {
    pub fn new() -> Self {
        Self {
            radius: 100.0,
            move_circle: false,
            x0: 0.0,
            y0: 0.0,
            reset_edges: true,
            disable_edge_style: true,
        }
    }

    fn circle(&self, graph: &mut Graph, vertices: &[CellId], r: f64, left: f64, top: f64) {
        let phi = 2.0 * PI / vertices.len() as f64;
        for (i, &vertex) in vertices.iter().enumerate() {
            if base::is_vertex_movable(graph, vertex) {
                let angle = i as f64 * phi;
                base::set_vertex_location(
                    graph,
                    vertex,
                    left + r + r * angle.sin(),
                    top + r + r * angle.cos(),
                );
            }
        }
    }
}

impl Layout for CircleLayout {
    fn execute(&mut self, graph: &mut Graph, parent: CellId) {
        graph.begin_update();
        let mut max_dim = 0.0f64;
        let mut top: Option<f64> = None;
        let mut left: Option<f64> = None;
        let mut vertices = Vec::new();
        for child in graph.model.children(parent).to_vec() {
            if !base::is_vertex_ignored(graph, child) {
                vertices.push(child);
                let bounds = base::vertex_bounds(graph, child);
                top = Some(top.map_or(bounds.y, |t| t.min(bounds.y)));
                left = Some(left.map_or(bounds.x, |l| l.min(bounds.x)));
                max_dim = max_dim.max(bounds.width.max(bounds.height));
            } else if !base::is_edge_ignored(graph, child) {
                if self.reset_edges {
                    graph.reset_edge(child);
                }
                if self.disable_edge_style {
                    base::set_edge_style_enabled(graph, child, false);
                }
            }
        }
        if !vertices.is_empty() {
            let r = (vertices.len() as f64 * max_dim / PI).max(self.radius);
            let (left, top) = if self.move_circle {
                (self.x0, self.y0)
            } else {
                (left.unwrap_or(0.0), top.unwrap_or(0.0))
            };
            self.circle(graph, &vertices, r, left, top);
        }
        graph.end_update();
    }
}
