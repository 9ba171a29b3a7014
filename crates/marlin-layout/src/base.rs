//! Shared layout machinery.

use marlin_model::cell::CellId;
use marlin_model::geometry::{Point, Rect};
use marlin_model::graph::Graph;
use marlin_model::style::keys;
use rustc_hash::FxHashSet;

/// A layout mutates cell geometries under one parent. Implementations bracket their edits
/// in a single `begin_update`/`end_update` pair so observers see one batch.
pub trait Layout {
    fn execute(&mut self, graph: &mut Graph, parent: CellId);

    /// Hook for interactive use: a cell managed by this layout was dropped at the given
    /// location. The default does nothing.
    fn move_cell(&mut self, _graph: &mut Graph, _cell: CellId, _x: f64, _y: f64) {}
}

/// Hidden cells and non-vertices take no part in vertex placement.
pub fn is_vertex_ignored(graph: &Graph, vertex: CellId) -> bool {
    !graph.model.is_vertex(vertex) || !graph.model.is_visible(vertex)
}

/// Hidden, dangling and non-edge cells take no part in edge routing.
pub fn is_edge_ignored(graph: &Graph, edge: CellId) -> bool {
    !graph.model.is_edge(edge)
        || !graph.model.is_visible(edge)
        || graph.model.terminal(edge, true).is_none()
        || graph.model.terminal(edge, false).is_none()
}

pub fn is_vertex_movable(graph: &Graph, cell: CellId) -> bool {
    graph.is_cell_movable(cell)
}

pub fn vertex_bounds(graph: &Graph, vertex: CellId) -> Rect {
    graph
        .model
        .geometry(vertex)
        .map_or_else(Rect::default, |geo| geo.rect())
}

pub fn set_vertex_location(graph: &mut Graph, vertex: CellId, x: f64, y: f64) {
    let Some(geo) = graph.model.geometry(vertex) else {
        return;
    };
    if geo.x != x || geo.y != y {
        let mut geo = geo.clone();
        geo.x = x;
        geo.y = y;
        graph.model.set_geometry(vertex, Some(geo));
    }
}

pub fn set_edge_points(graph: &mut Graph, edge: CellId, points: Vec<Point>) {
    if let Some(mut geo) = graph.model.geometry(edge).cloned() {
        geo.points = points;
        graph.model.set_geometry(edge, Some(geo));
    }
}

/// Marks an edge so view-side edge styles leave the routed points alone.
pub fn set_edge_style_enabled(graph: &mut Graph, edge: CellId, enabled: bool) {
    let mut style = graph.model.style(edge).clone();
    let value = if enabled { "0" } else { "1" };
    style.insert(keys::NO_EDGE_STYLE.to_string(), value.to_string());
    graph.model.set_style(edge, style);
}

/// Depth-first walk over the connectivity graph starting at `vertex`. The visitor receives
/// each vertex with the edge it was reached through and prunes the branch by returning
/// `false`. With `directed`, only outgoing edges are followed.
pub fn traverse(
    graph: &Graph,
    vertex: CellId,
    directed: bool,
    visitor: &mut dyn FnMut(CellId, Option<CellId>) -> bool,
) {
    let mut visited = FxHashSet::default();
    traverse_inner(graph, vertex, directed, visitor, None, &mut visited);
}

fn traverse_inner(
    graph: &Graph,
    vertex: CellId,
    directed: bool,
    visitor: &mut dyn FnMut(CellId, Option<CellId>) -> bool,
    edge: Option<CellId>,
    visited: &mut FxHashSet<CellId>,
) {
    if !visited.insert(vertex) {
        return;
    }
    if !visitor(vertex, edge) {
        return;
    }
    for &next_edge in graph.model.edges_of(vertex) {
        let is_source = graph.model.terminal(next_edge, true) == Some(vertex);
        if directed && !is_source {
            continue;
        }
        if let Some(opposite) = graph.model.terminal(next_edge, !is_source) {
            traverse_inner(graph, opposite, directed, visitor, Some(next_edge), visited);
        }
    }
}
