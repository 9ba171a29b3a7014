use marlin_layout::{FastOrganicLayout, Layout};
use marlin_model::cell::CellId;
use marlin_model::graph::Graph;
use marlin_model::style::Style;

fn ring(n: usize) -> (Graph, Vec<CellId>) {
    let mut graph = Graph::new();
    let parent = graph.default_parent();
    let cells: Vec<CellId> = (0..n)
        .map(|i| {
            graph.insert_vertex(
                parent,
                None,
                None,
                (i % 3) as f64 * 30.0,
                (i / 3) as f64 * 30.0,
                20.0,
                20.0,
                Style::new(),
            )
        })
        .collect();
    for i in 0..n {
        let (a, b) = (cells[i], cells[(i + 1) % n]);
        graph.insert_edge(parent, None, None, Some(a), Some(b), Style::new());
    }
    (graph, cells)
}

#[test]
fn cooling_reaches_zero_on_the_last_iteration() {
    let (mut graph, _) = ring(4);
    let parent = graph.default_parent();
    let mut layout = FastOrganicLayout::new();

    layout.execute(&mut graph, parent);

    assert_eq!(layout.temperature(), 0.0);
    assert_eq!(layout.iterations_run(), (20.0 * 4.0f64.sqrt()).round() as u32);
}

#[test]
fn explicit_iteration_budget_is_respected() {
    let (mut graph, _) = ring(3);
    let parent = graph.default_parent();
    let mut layout = FastOrganicLayout::new();
    layout.max_iterations = 5;

    layout.execute(&mut graph, parent);

    assert_eq!(layout.iterations_run(), 5);
    assert_eq!(layout.temperature(), 0.0);
}

#[test]
fn unconnected_vertices_are_left_alone() {
    let (mut graph, _) = ring(3);
    let parent = graph.default_parent();
    let lone = graph.insert_vertex(parent, None, None, 400.0, 400.0, 20.0, 20.0, Style::new());

    FastOrganicLayout::new().execute(&mut graph, parent);

    let geo = graph.model.geometry(lone).unwrap();
    assert_eq!((geo.x, geo.y), (400.0, 400.0));
}

#[test]
fn cancellation_leaves_every_geometry_untouched() {
    let (mut graph, cells) = ring(4);
    let parent = graph.default_parent();
    let before: Vec<(f64, f64)> = cells
        .iter()
        .map(|&c| {
            let g = graph.model.geometry(c).unwrap();
            (g.x, g.y)
        })
        .collect();
    let mut layout = FastOrganicLayout::new();
    layout.cancel_handle().cancel();

    layout.execute(&mut graph, parent);

    assert_eq!(layout.iterations_run(), 0);
    for (&cell, &(x, y)) in cells.iter().zip(&before) {
        let geo = graph.model.geometry(cell).unwrap();
        assert_eq!((geo.x, geo.y), (x, y));
    }
}

#[test]
fn results_are_deterministic_across_runs() {
    let run = || {
        let (mut graph, cells) = ring(6);
        let parent = graph.default_parent();
        FastOrganicLayout::new().execute(&mut graph, parent);
        cells
            .iter()
            .map(|&c| {
                let g = graph.model.geometry(c).unwrap();
                (g.x, g.y)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn result_is_translated_to_the_input_origin() {
    let (mut graph, cells) = ring(4);
    let parent = graph.default_parent();
    let mut layout = FastOrganicLayout::new();
    layout.use_input_origin = false;

    layout.execute(&mut graph, parent);

    let min_x = cells
        .iter()
        .map(|&c| graph.model.geometry(c).unwrap().x)
        .fold(f64::INFINITY, f64::min);
    let min_y = cells
        .iter()
        .map(|&c| graph.model.geometry(c).unwrap().y)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(min_x, 1.0);
    assert_eq!(min_y, 1.0);
    for &c in &cells {
        let geo = graph.model.geometry(c).unwrap();
        assert_eq!(geo.x, geo.x.round());
        assert_eq!(geo.y, geo.y.round());
    }
}
