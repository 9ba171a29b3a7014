use marlin_model::cell::Cell;
use marlin_model::geometry::Geometry;
use marlin_model::model::Model;
use marlin_model::path;
use std::cmp::Ordering;

fn vertex(model: &mut Model) -> marlin_model::cell::CellId {
    model.create(Cell::vertex(Geometry::new(0.0, 0.0, 10.0, 10.0)))
}

#[test]
fn create_walks_child_indices_from_root() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let a = vertex(&mut model);
    let b = vertex(&mut model);
    let c = vertex(&mut model);
    model.insert_child(parent, a, None);
    model.insert_child(parent, b, None);
    model.insert_child(b, c, None);

    assert_eq!(path::create(&model, model.root()), "");
    assert_eq!(path::create(&model, parent), "0");
    assert_eq!(path::create(&model, a), "0.0");
    assert_eq!(path::create(&model, b), "0.1");
    assert_eq!(path::create(&model, c), "0.1.0");
}

#[test]
fn resolve_inverts_create() {
    let mut model = Model::new();
    let parent = model.default_parent();
    let a = vertex(&mut model);
    let b = vertex(&mut model);
    model.insert_child(parent, a, None);
    model.insert_child(a, b, None);

    let root = model.root();
    for cell in [root, parent, a, b] {
        let p = path::create(&model, cell);
        assert_eq!(path::resolve(&model, root, &p), Some(cell));
    }
    assert_eq!(path::resolve(&model, root, "0.7"), None);
    assert_eq!(path::resolve(&model, root, "x"), None);
}

#[test]
fn parent_path_strips_one_segment() {
    assert_eq!(path::parent_path(""), None);
    assert_eq!(path::parent_path("0"), Some(""));
    assert_eq!(path::parent_path("0.1"), Some("0"));
    assert_eq!(path::parent_path("0.1.4"), Some("0.1"));
}

#[test]
fn compare_orders_segments_numerically() {
    assert_eq!(path::compare("0.2", "0.2"), Ordering::Equal);
    assert_eq!(path::compare("0.2", "0.10"), Ordering::Less);
    assert_eq!(path::compare("0.10", "0.9"), Ordering::Greater);
    // A prefix sorts before its extensions.
    assert_eq!(path::compare("0.1", "0.1.0"), Ordering::Less);
    assert_eq!(path::compare("", "0"), Ordering::Less);
}
