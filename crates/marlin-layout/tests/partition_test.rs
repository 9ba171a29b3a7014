use marlin_layout::{Layout, PartitionLayout};
use marlin_model::cell::CellId;
use marlin_model::graph::Graph;
use marlin_model::style::Style;

fn setup(parent_w: f64, parent_h: f64, children: usize) -> (Graph, CellId, Vec<CellId>) {
    let mut graph = Graph::new();
    graph.extend_parents = false;
    graph.constrain_children = false;
    let root_parent = graph.default_parent();
    let lane = graph.insert_vertex(
        root_parent,
        None,
        None,
        0.0,
        0.0,
        parent_w,
        parent_h,
        Style::new(),
    );
    let cells = (0..children)
        .map(|_| graph.insert_vertex(lane, None, None, 0.0, 0.0, 10.0, 10.0, Style::new()))
        .collect();
    (graph, lane, cells)
}

#[test]
fn horizontal_partition_divides_the_width_evenly() {
    let (mut graph, lane, cells) = setup(100.0, 60.0, 4);

    PartitionLayout::new(true).execute(&mut graph, lane);

    for (i, &cell) in cells.iter().enumerate() {
        let geo = graph.model.geometry(cell).unwrap();
        assert_eq!(geo.x, i as f64 * 25.0);
        assert_eq!(geo.y, 0.0);
        assert_eq!(geo.width, 25.0);
        assert_eq!(geo.height, 60.0);
    }
}

#[test]
fn vertical_partition_divides_the_height() {
    let (mut graph, lane, cells) = setup(80.0, 90.0, 3);

    PartitionLayout::new(false).execute(&mut graph, lane);

    for (i, &cell) in cells.iter().enumerate() {
        let geo = graph.model.geometry(cell).unwrap();
        assert_eq!(geo.y, i as f64 * 30.0);
        assert_eq!(geo.height, 30.0);
        assert_eq!(geo.width, 80.0);
    }
}

#[test]
fn spacing_and_border_shrink_the_slots() {
    let (mut graph, lane, cells) = setup(110.0, 60.0, 2);
    let mut layout = PartitionLayout::new(true);
    layout.border = 10.0;
    layout.spacing = 10.0;

    layout.execute(&mut graph, lane);

    // value = (110 - 10 - (10 + 1 * 10)) / 2 = 40
    let g0 = graph.model.geometry(cells[0]).unwrap();
    let g1 = graph.model.geometry(cells[1]).unwrap();
    assert_eq!((g0.x, g0.width), (10.0, 40.0));
    assert_eq!((g1.x, g1.width), (60.0, 40.0));
    assert_eq!(g0.height, 60.0 - 20.0);
}

#[test]
fn no_positive_slot_leaves_children_untouched() {
    let (mut graph, lane, cells) = setup(100.0, 60.0, 2);
    let mut layout = PartitionLayout::new(true);
    layout.border = 60.0;

    layout.execute(&mut graph, lane);

    let geo = graph.model.geometry(cells[0]).unwrap();
    assert_eq!((geo.x, geo.width), (0.0, 10.0));
}

#[test]
fn resize_vertices_false_only_repositions() {
    let (mut graph, lane, cells) = setup(100.0, 60.0, 4);
    let mut layout = PartitionLayout::new(true);
    layout.resize_vertices = false;

    layout.execute(&mut graph, lane);

    let geo = graph.model.geometry(cells[2]).unwrap();
    assert_eq!(geo.x, 50.0);
    assert_eq!((geo.width, geo.height), (10.0, 10.0));
}
