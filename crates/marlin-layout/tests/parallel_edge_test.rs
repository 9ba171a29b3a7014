use marlin_layout::{Layout, ParallelEdgeLayout};
use marlin_model::cell::CellId;
use marlin_model::geometry::Point;
use marlin_model::graph::Graph;
use marlin_model::style::Style;

fn vertex(graph: &mut Graph, x: f64, y: f64, w: f64, h: f64) -> CellId {
    let parent = graph.default_parent();
    graph.insert_vertex(parent, None, None, x, y, w, h, Style::new())
}

fn edge(graph: &mut Graph, source: CellId, target: CellId) -> CellId {
    let parent = graph.default_parent();
    graph.insert_edge(parent, None, None, Some(source), Some(target), Style::new())
}

fn waypoints(graph: &Graph, e: CellId) -> Vec<Point> {
    graph.model.geometry(e).unwrap().points.clone()
}

#[test]
fn parallel_edges_fan_out_around_the_midpoint() {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let a = vertex(&mut graph, 0.0, 0.0, 20.0, 20.0);
    let b = vertex(&mut graph, 100.0, 0.0, 20.0, 20.0);
    let e1 = edge(&mut graph, a, b);
    let e2 = edge(&mut graph, a, b);

    ParallelEdgeLayout::new().execute(&mut graph, parent);

    // Horizontal connection: the fan spreads vertically around (60, 10).
    assert_eq!(waypoints(&graph, e1), vec![Point::new(60.0, 0.0)]);
    assert_eq!(waypoints(&graph, e2), vec![Point::new(60.0, 20.0)]);
}

#[test]
fn grouping_ignores_edge_direction() {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let a = vertex(&mut graph, 0.0, 0.0, 20.0, 20.0);
    let b = vertex(&mut graph, 100.0, 0.0, 20.0, 20.0);
    let e1 = edge(&mut graph, a, b);
    let e2 = edge(&mut graph, b, a);

    ParallelEdgeLayout::new().execute(&mut graph, parent);

    // Both edges are in one group, so both are routed.
    assert_eq!(waypoints(&graph, e1).len(), 1);
    assert_eq!(waypoints(&graph, e2).len(), 1);
    assert_ne!(waypoints(&graph, e1), waypoints(&graph, e2));
}

#[test]
fn a_single_edge_gets_a_straight_midpoint() {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let a = vertex(&mut graph, 0.0, 0.0, 20.0, 20.0);
    let b = vertex(&mut graph, 0.0, 100.0, 20.0, 20.0);
    let e = edge(&mut graph, a, b);

    ParallelEdgeLayout::new().execute(&mut graph, parent);

    assert_eq!(waypoints(&graph, e), vec![Point::new(10.0, 60.0)]);
}

#[test]
fn loops_step_away_from_the_vertex() {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let a = vertex(&mut graph, 0.0, 0.0, 40.0, 40.0);
    let l1 = edge(&mut graph, a, a);
    let l2 = edge(&mut graph, a, a);

    ParallelEdgeLayout::new().execute(&mut graph, parent);

    assert_eq!(waypoints(&graph, l1), vec![Point::new(60.0, 20.0)]);
    assert_eq!(waypoints(&graph, l2), vec![Point::new(80.0, 20.0)]);
}

#[test]
fn dangling_edges_are_ignored() {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let a = vertex(&mut graph, 0.0, 0.0, 20.0, 20.0);
    let e = graph.insert_edge(parent, None, None, Some(a), None, Style::new());

    ParallelEdgeLayout::new().execute(&mut graph, parent);

    assert!(waypoints(&graph, e).is_empty());
}

#[test]
fn unmovable_edges_keep_their_route() {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let a = vertex(&mut graph, 0.0, 0.0, 20.0, 20.0);
    let b = vertex(&mut graph, 100.0, 0.0, 20.0, 20.0);
    let mut pinned = Style::new();
    pinned.insert("movable".to_string(), "0".to_string());
    let e1 = graph.insert_edge(parent, None, None, Some(a), Some(b), pinned);
    let e2 = edge(&mut graph, a, b);

    ParallelEdgeLayout::new().execute(&mut graph, parent);

    assert!(waypoints(&graph, e1).is_empty());
    assert_eq!(waypoints(&graph, e2).len(), 1);
}
