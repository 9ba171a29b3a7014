use marlin_model::cell::Cell;
use marlin_model::error::ModelError;
use marlin_model::geometry::Geometry;
use marlin_model::model::Model;

#[test]
fn new_model_has_root_with_default_layer() {
    let model = Model::new();
    let root = model.root();
    assert_eq!(model.child_count(root), 1);
    assert_eq!(model.parent(root), None);
    let layer = model.default_parent();
    assert_eq!(model.parent(layer), Some(root));
}

#[test]
fn created_cells_start_detached() {
    let mut model = Model::new();
    let v = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    assert_eq!(model.parent(v), None);
    assert!(model.is_vertex(v));
    assert!(!model.is_edge(v));
    assert!(model.is_visible(v));
    assert!(model.edges_of(v).is_empty());
}

#[test]
fn insert_child_appends_and_reorders() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let a = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let b = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    model.insert_child(parent, a, None);
    model.insert_child(parent, b, None);
    assert_eq!(model.children(parent), &[a, b]);
    assert_eq!(model.index_of(parent, b), Some(1));

    // Re-inserting an existing child moves it.
    model.insert_child(parent, b, Some(0));
    assert_eq!(model.children(parent), &[b, a]);
    assert_eq!(model.child_count(parent), 2);

    // Default index keeps a re-inserted child at the end.
    model.insert_child(parent, b, None);
    assert_eq!(model.children(parent), &[a, b]);
}

#[test]
fn remove_child_at_handles_out_of_range() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let a = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    model.insert_child(parent, a, None);
    assert_eq!(model.remove_child_at(parent, 5), None);
    assert_eq!(model.remove_child_at(parent, 0), Some(a));
    assert_eq!(model.parent(a), None);
    assert_eq!(model.child_count(parent), 0);
}

#[test]
fn insert_that_would_create_cycle_is_refused() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let a = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let b = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    model.insert_child(parent, a, None);
    model.insert_child(a, b, None);

    assert_eq!(model.insert_child(b, a, None), None);
    assert!(matches!(
        model.try_insert_child(b, a, None),
        Err(ModelError::Cycle)
    ));
    // Self-insertion is a cycle too.
    assert_eq!(model.insert_child(a, a, None), None);
    // Structure is untouched.
    assert_eq!(model.parent(a), Some(parent));
    assert_eq!(model.parent(b), Some(a));
}

#[test]
fn a_cell_is_its_own_ancestor() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let a = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let b = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    model.insert_child(parent, a, None);
    model.insert_child(a, b, None);

    assert!(model.is_ancestor(a, a));
    assert!(model.is_ancestor(a, b));
    assert!(model.is_ancestor(model.root(), b));
    assert!(!model.is_ancestor(b, a));
}

#[test]
fn nearest_common_ancestor_walks_paths() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let group = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 100.0, 100.0)));
    let a = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let b = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let c = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    model.insert_child(parent, group, None);
    model.insert_child(group, a, None);
    model.insert_child(group, b, None);
    model.insert_child(parent, c, None);

    assert_eq!(model.nearest_common_ancestor(a, b), Some(group));
    assert_eq!(model.nearest_common_ancestor(a, c), Some(parent));
    assert_eq!(model.nearest_common_ancestor(a, group), Some(group));
}

#[test]
fn set_terminal_maintains_reverse_edge_lists() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let a = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let b = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let c = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let e = model.create(Cell::edge());
    for cell in [a, b, c, e] {
        model.insert_child(parent, cell, None);
    }
    model.set_terminal(e, Some(a), true);
    model.set_terminal(e, Some(b), false);
    assert_eq!(model.terminal(e, true), Some(a));
    assert_eq!(model.terminal(e, false), Some(b));
    assert_eq!(model.edges_of(a), &[e]);
    assert_eq!(model.edges_of(b), &[e]);

    // Reconnecting the target moves the reverse reference.
    model.set_terminal(e, Some(c), false);
    assert!(model.edges_of(b).is_empty());
    assert_eq!(model.edges_of(c), &[e]);

    model.set_terminal(e, None, true);
    assert_eq!(model.terminal(e, true), None);
    assert!(model.edges_of(a).is_empty());
}

#[test]
fn self_loop_is_listed_once_and_survives_single_disconnect() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let a = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let e = model.create(Cell::edge());
    model.insert_child(parent, a, None);
    model.insert_child(parent, e, None);
    model.set_terminal(e, Some(a), true);
    model.set_terminal(e, Some(a), false);
    assert_eq!(model.edges_of(a), &[e]);

    // One end still points at the vertex, so the edge stays listed.
    model.set_terminal(e, None, true);
    assert_eq!(model.edges_of(a), &[e]);
    model.set_terminal(e, None, false);
    assert!(model.edges_of(a).is_empty());
}

#[test]
fn edge_connections_filters_by_role() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let a = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let b = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let out = model.create(Cell::edge());
    let inc = model.create(Cell::edge());
    let lp = model.create(Cell::edge());
    for cell in [a, b, out, inc, lp] {
        model.insert_child(parent, cell, None);
    }
    model.set_terminal(out, Some(a), true);
    model.set_terminal(out, Some(b), false);
    model.set_terminal(inc, Some(b), true);
    model.set_terminal(inc, Some(a), false);
    model.set_terminal(lp, Some(a), true);
    model.set_terminal(lp, Some(a), false);

    assert_eq!(model.edge_connections(a, false, true, false), vec![out]);
    assert_eq!(model.edge_connections(a, true, false, false), vec![inc]);
    assert_eq!(model.edge_connections(a, true, true, false), vec![out, inc]);
    assert_eq!(
        model.edge_connections(a, true, true, true),
        vec![out, inc, lp]
    );
}

#[test]
fn descendants_are_in_document_order() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let group = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 100.0, 100.0)));
    let a = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    let b = model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)));
    model.insert_child(parent, group, None);
    model.insert_child(group, a, None);
    model.insert_child(group, b, None);

    assert_eq!(model.descendants(group), vec![group, a, b]);
    let vertices_only =
        model.filter_descendants(model.root(), Some(&|m: &Model, c| m.is_vertex(c)));
    assert_eq!(vertices_only, vec![group, a, b]);
}

#[test]
fn clone_record_copies_payload_but_not_linkage() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let a = model.create(Cell::vertex(Geometry::new(5.0, 6.0, 10.0, 10.0)));
    model.insert_child(parent, a, None);
    model.set_value(a, Some(serde_json::json!({"label": "a"})));

    let record = model.clone_cell_record(a);
    assert_eq!(record.value, Some(serde_json::json!({"label": "a"})));
    assert_eq!(record.geometry.as_ref().map(|g| g.x), Some(5.0));
    assert_eq!(record.parent(), None);
    assert!(record.children().is_empty());
    assert!(record.edges().is_empty());
}
