//! Pure queries over cell sets plus identity-preserving deep cloning.

use crate::cell::CellId;
use crate::model::Model;
use rustc_hash::{FxHashMap, FxHashSet};

/// The subset of `cells` whose ancestor chain contains no other member of `cells`,
/// i.e. a selection collapsed to its maximal roots.
pub fn topmost_cells(model: &Model, cells: &[CellId]) -> Vec<CellId> {
    let members: FxHashSet<CellId> = cells.iter().copied().collect();
    let mut out = Vec::new();
    for &cell in cells {
        let mut topmost = true;
        let mut cur = model.parent(cell);
        while let Some(parent) = cur {
            if members.contains(&parent) {
                topmost = false;
                break;
            }
            cur = model.parent(parent);
        }
        if topmost {
            out.push(cell);
        }
    }
    out
}

/// Distinct parents of the given cells, in first-seen order.
pub fn parent_cells(model: &Model, cells: &[CellId]) -> Vec<CellId> {
    let mut seen: FxHashSet<CellId> = FxHashSet::default();
    let mut out = Vec::new();
    for &cell in cells {
        if let Some(parent) = model.parent(cell) {
            if seen.insert(parent) {
                out.push(parent);
            }
        }
    }
    out
}

/// Opposite endpoints of `edges` as seen from `terminal`, filtered by terminal role.
pub fn opposites(
    model: &Model,
    edges: &[CellId],
    terminal: CellId,
    include_sources: bool,
    include_targets: bool,
) -> Vec<CellId> {
    let mut out = Vec::new();
    for &edge in edges {
        let source = model.terminal(edge, true);
        let target = model.terminal(edge, false);
        if source == Some(terminal) {
            if let Some(target) = target {
                if target != terminal && include_targets {
                    out.push(target);
                }
            }
        } else if target == Some(terminal) {
            if let Some(source) = source {
                if source != terminal && include_sources {
                    out.push(source);
                }
            }
        }
    }
    out
}

/// Deep clone preserving internal references. Clones are created first (memoized per
/// original in `mapping`), then a restoration pass reconnects each clone's terminals to
/// the clones of its original's terminals where those were part of the cloned set.
/// Terminals outside the set are left unset. Two phases are required because an edge may
/// reference a cell that has not been cloned yet when the edge itself is cloned.
pub fn clone_cells(
    model: &mut Model,
    cells: &[CellId],
    include_children: bool,
    mapping: &mut FxHashMap<CellId, CellId>,
) -> Vec<CellId> {
    let mut pairs: Vec<(CellId, CellId)> = Vec::new();
    let mut out = Vec::with_capacity(cells.len());
    for &cell in cells {
        out.push(clone_cell_impl(
            model,
            cell,
            include_children,
            mapping,
            &mut pairs,
        ));
    }
    for &(original, clone) in &pairs {
        restore_clone(model, clone, original, mapping);
    }
    out
}

fn clone_cell_impl(
    model: &mut Model,
    cell: CellId,
    include_children: bool,
    mapping: &mut FxHashMap<CellId, CellId>,
    pairs: &mut Vec<(CellId, CellId)>,
) -> CellId {
    if let Some(&existing) = mapping.get(&cell) {
        return existing;
    }
    let record = model.clone_cell_record(cell);
    let clone = model.create(record);
    mapping.insert(cell, clone);
    pairs.push((cell, clone));
    if include_children {
        let children = model.children(cell).to_vec();
        for child in children {
            let child_clone = clone_cell_impl(model, child, true, mapping, pairs);
            model.insert_child(clone, child_clone, None);
        }
    }
    clone
}

fn restore_clone(
    model: &mut Model,
    clone: CellId,
    original: CellId,
    mapping: &FxHashMap<CellId, CellId>,
) {
    for is_source in [true, false] {
        if let Some(terminal) = model.terminal(original, is_source) {
            if let Some(&terminal_clone) = mapping.get(&terminal) {
                model.connect_terminal(terminal_clone, clone, is_source);
            }
        }
    }
}
