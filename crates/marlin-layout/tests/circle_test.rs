use marlin_layout::{CircleLayout, Layout};
use marlin_model::cell::CellId;
use marlin_model::graph::Graph;
use marlin_model::style::Style;
use std::f64::consts::PI;

fn vertices(graph: &mut Graph, n: usize, size: f64) -> Vec<CellId> {
    let parent = graph.default_parent();
    (0..n)
        .map(|_| graph.insert_vertex(parent, None, None, 0.0, 0.0, size, size, Style::new()))
        .collect()
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn small_rings_use_the_minimum_radius() {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let cells = vertices(&mut graph, 4, 20.0);

    CircleLayout::new().execute(&mut graph, parent);

    // 4 * 20 / pi is well under the default radius of 100.
    let r = 100.0;
    let expected = [
        (r, 2.0 * r),
        (2.0 * r, r),
        (r, 0.0),
        (0.0, r),
    ];
    for (&cell, &(x, y)) in cells.iter().zip(&expected) {
        let geo = graph.model.geometry(cell).unwrap();
        assert_close(geo.x, x);
        assert_close(geo.y, y);
    }
}

#[test]
fn radius_grows_with_the_vertex_count() {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let cells = vertices(&mut graph, 20, 50.0);

    CircleLayout::new().execute(&mut graph, parent);

    let r = 20.0 * 50.0 / PI;
    assert!(r > 100.0);
    for &cell in &cells {
        let geo = graph.model.geometry(cell).unwrap();
        let dx = geo.x - r;
        let dy = geo.y - r;
        assert_close((dx * dx + dy * dy).sqrt(), r);
    }
}

#[test]
fn move_circle_anchors_at_the_given_origin() {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let cells = vertices(&mut graph, 3, 10.0);
    let mut layout = CircleLayout::new();
    layout.move_circle = true;
    layout.x0 = 500.0;
    layout.y0 = 300.0;

    layout.execute(&mut graph, parent);

    let geo = graph.model.geometry(cells[0]).unwrap();
    assert_close(geo.x, 500.0 + 100.0);
    assert_close(geo.y, 300.0 + 200.0);
}

#[test]
fn hidden_vertices_are_skipped() {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let cells = vertices(&mut graph, 3, 10.0);
    graph.model.set_visible(cells[2], false);

    CircleLayout::new().execute(&mut graph, parent);

    // The hidden vertex keeps its input position.
    assert_eq!(graph.model.geometry(cells[2]).unwrap().x, 0.0);
    // The ring is computed for the remaining two.
    let geo = graph.model.geometry(cells[0]).unwrap();
    assert_close(geo.x, 100.0);
    assert_close(geo.y, 200.0);
}

#[test]
fn edges_between_ring_members_are_reset() {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let cells = vertices(&mut graph, 2, 10.0);
    let edge = graph.insert_edge(parent, None, None, Some(cells[0]), Some(cells[1]), Style::new());
    let mut geo = graph.model.geometry(edge).unwrap().clone();
    geo.points = vec![marlin_model::geometry::Point::new(5.0, 5.0)];
    graph.model.set_geometry(edge, Some(geo));

    CircleLayout::new().execute(&mut graph, parent);

    assert!(graph.model.geometry(edge).unwrap().points.is_empty());
}
