//! Splits a parent's interior evenly among its children.

use crate::base::{self, Layout};
use marlin_model::cell::CellId;
use marlin_model::graph::Graph;

/// Divides the parent along one axis into equal slots, stretching each child to fill the
/// other axis. A swimlane parent's header is left untouched. When border and spacing leave
/// no positive slot width the layout is a no-op.
pub struct PartitionLayout {
    pub horizontal: bool,
    pub spacing: f64,
    pub border: f64,
    pub resize_vertices: bool,
}

impl PartitionLayout {
    pub fn new(horizontal: bool) -> Self {
        Self {
            horizontal,
            spacing: 0.0,
            border: 0.0,
            resize_vertices: true,
        }
    }
}

impl Layout for PartitionLayout {
    fn execute(&mut self, graph: &mut Graph, parent: CellId) {
        let Some(pgeo) = graph.model.geometry(parent).cloned() else {
            return;
        };
        let children: Vec<CellId> = graph
            .model
            .children(parent)
            .iter()
            .copied()
            .filter(|&c| !base::is_vertex_ignored(graph, c) && base::is_vertex_movable(graph, c))
            .collect();
        let n = children.len();
        if n == 0 {
            return;
        }
        let mut x0 = self.border;
        let mut y0 = self.border;
        let mut other = if self.horizontal {
            pgeo.height
        } else {
            pgeo.width
        };
        other -= 2.0 * self.border;
        let (start_w, start_h) = if graph.is_swimlane(parent) {
            graph.start_size(parent)
        } else {
            (0.0, 0.0)
        };
        other -= if self.horizontal { start_h } else { start_w };
        x0 += start_w;
        y0 += start_h;
        let tmp = self.border + (n - 1) as f64 * self.spacing;
        let value = if self.horizontal {
            (pgeo.width - x0 - tmp) / n as f64
        } else {
            (pgeo.height - y0 - tmp) / n as f64
        };
        // Border plus spacing can exceed the available space; leave the children alone then.
        if value <= 0.0 {
            return;
        }
        graph.begin_update();
        for child in children {
            let Some(mut geo) = graph.model.geometry(child).cloned() else {
                continue;
            };
            geo.x = x0;
            geo.y = y0;
            if self.horizontal {
                if self.resize_vertices {
                    geo.width = value;
                    geo.height = other;
                }
                x0 += value + self.spacing;
            } else {
                if self.resize_vertices {
                    geo.height = value;
                    geo.width = other;
                }
                y0 += value + self.spacing;
            }
            graph.model.set_geometry(child, Some(geo));
        }
        graph.end_update();
    }
}
