//! Hierarchy path addressing.
//!
//! A path is the dot-separated sequence of child indices from the root down to a cell,
//! e.g. `"0.2.1"`. Paths are stable as long as the hierarchy does not change and give a
//! total order over cells that matches document (z-)order.

use crate::cell::CellId;
use crate::model::Model;
use std::cmp::Ordering;

pub const SEPARATOR: char = '.';

/// The path for `cell`; empty for the root.
pub fn create(model: &Model, cell: CellId) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut cur = cell;
    while let Some(parent) = model.parent(cur) {
        let index = model.index_of(parent, cur).unwrap_or(0);
        segments.push(index.to_string());
        cur = parent;
    }
    segments.reverse();
    segments.join(".")
}

/// Strips the last segment; `None` for the root path.
pub fn parent_path(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    match path.rfind(SEPARATOR) {
        Some(i) => Some(&path[..i]),
        None => Some(""),
    }
}

/// Walks the indices in `path` down from `root`.
pub fn resolve(model: &Model, root: CellId, path: &str) -> Option<CellId> {
    let mut cell = root;
    if path.is_empty() {
        return Some(cell);
    }
    for segment in path.split(SEPARATOR) {
        let index: usize = segment.parse().ok()?;
        cell = model.child_at(cell, index)?;
    }
    Some(cell)
}

/// Segment-wise numeric comparison with a lexical tie-break on empty segments, then a
/// length comparison. Strict total order over well-formed paths.
pub fn compare(p1: &str, p2: &str) -> Ordering {
    let a: Vec<&str> = if p1.is_empty() {
        Vec::new()
    } else {
        p1.split(SEPARATOR).collect()
    };
    let b: Vec<&str> = if p2.is_empty() {
        Vec::new()
    } else {
        p2.split(SEPARATOR).collect()
    };
    let min = a.len().min(b.len());
    for i in 0..min {
        if a[i] == b[i] {
            continue;
        }
        if a[i].is_empty() || b[i].is_empty() {
            return a[i].cmp(b[i]);
        }
        return match (a[i].parse::<i64>(), b[i].parse::<i64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a[i].cmp(b[i]),
        };
    }
    a.len().cmp(&b.len())
}
