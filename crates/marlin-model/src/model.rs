//! The cell arena and its structural operations.
//!
//! All cells live in an append-only arena owned by [`Model`]; `CellId`s are stable for the
//! lifetime of the model (removal detaches a cell, it never frees the slot). Parent/child and
//! source/target links are plain ids, so there are no ownership cycles and clone/remap is an
//! id-translation table.

use crate::cell::{Cell, CellId};
use crate::error::{ModelError, Result};
use crate::geometry::Geometry;
use crate::path;
use crate::style::Style;
use tracing::trace;

pub struct Model {
    cells: Vec<Cell>,
    root: CellId,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// A model with a root cell owning a single default layer.
    pub fn new() -> Self {
        let mut model = Self {
            cells: Vec::new(),
            root: CellId(0),
        };
        let root = model.create(Cell::new());
        let layer = model.create(Cell::new());
        model.insert_child(root, layer, None);
        model.root = root;
        model
    }

    /// Adds a standalone cell to the arena. The cell starts detached: no parent, no edges.
    pub fn create(&mut self, mut cell: Cell) -> CellId {
        cell.parent = None;
        cell.children.clear();
        cell.source = None;
        cell.target = None;
        cell.edges.clear();
        let id = CellId(self.cells.len() as u32);
        self.cells.push(cell);
        id
    }

    pub fn root(&self) -> CellId {
        self.root
    }

    /// The first layer under the root, which is where new cells land by default.
    pub fn default_parent(&self) -> CellId {
        self.cells[self.root.index()]
            .children
            .first()
            .copied()
            .unwrap_or(self.root)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.index()]
    }

    pub fn is_vertex(&self, id: CellId) -> bool {
        self.cells[id.index()].vertex
    }

    pub fn is_edge(&self, id: CellId) -> bool {
        self.cells[id.index()].edge
    }

    pub fn is_connectable(&self, id: CellId) -> bool {
        self.cells[id.index()].connectable
    }

    pub fn is_visible(&self, id: CellId) -> bool {
        self.cells[id.index()].visible
    }

    pub fn is_collapsed(&self, id: CellId) -> bool {
        self.cells[id.index()].collapsed
    }

    pub fn set_visible(&mut self, id: CellId, visible: bool) {
        self.cells[id.index()].visible = visible;
    }

    pub fn set_collapsed(&mut self, id: CellId, collapsed: bool) {
        self.cells[id.index()].collapsed = collapsed;
    }

    pub fn geometry(&self, id: CellId) -> Option<&Geometry> {
        self.cells[id.index()].geometry.as_ref()
    }

    pub fn set_geometry(&mut self, id: CellId, geometry: Option<Geometry>) {
        self.cells[id.index()].geometry = geometry;
    }

    pub fn style(&self, id: CellId) -> &Style {
        &self.cells[id.index()].style
    }

    pub fn set_style(&mut self, id: CellId, style: Style) {
        self.cells[id.index()].style = style;
    }

    pub fn value(&self, id: CellId) -> Option<&serde_json::Value> {
        self.cells[id.index()].value.as_ref()
    }

    pub fn set_value(&mut self, id: CellId, value: Option<serde_json::Value>) {
        self.cells[id.index()].value = value;
    }

    // --- tree structure ---

    pub fn parent(&self, id: CellId) -> Option<CellId> {
        self.cells[id.index()].parent
    }

    pub fn children(&self, id: CellId) -> &[CellId] {
        &self.cells[id.index()].children
    }

    pub fn child_count(&self, id: CellId) -> usize {
        self.cells[id.index()].children.len()
    }

    pub fn child_at(&self, parent: CellId, index: usize) -> Option<CellId> {
        self.cells[parent.index()].children.get(index).copied()
    }

    pub fn index_of(&self, parent: CellId, child: CellId) -> Option<usize> {
        self.cells[parent.index()]
            .children
            .iter()
            .position(|&c| c == child)
    }

    /// True if `ancestor` lies on `cell`'s parent chain. A cell is its own ancestor.
    pub fn is_ancestor(&self, ancestor: CellId, cell: CellId) -> bool {
        let mut cur = Some(cell);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.cells[c.index()].parent;
        }
        false
    }

    /// Re-parents `child` under `parent` at `index` (append by default). Detaches the child
    /// from its previous parent first; when the child is already under `parent` the default
    /// index accounts for the upcoming removal. Refuses (no-op, returns `None`) if the move
    /// would create a parent cycle.
    pub fn insert_child(
        &mut self,
        parent: CellId,
        child: CellId,
        index: Option<usize>,
    ) -> Option<CellId> {
        match self.try_insert_child(parent, child, index) {
            Ok(id) => Some(id),
            Err(ModelError::Cycle) => {
                trace!(?parent, ?child, "refusing insert that would create a cycle");
                None
            }
        }
    }

    /// Like [`insert_child`](Self::insert_child) but surfaces the cycle refusal.
    pub fn try_insert_child(
        &mut self,
        parent: CellId,
        child: CellId,
        index: Option<usize>,
    ) -> Result<CellId> {
        if self.is_ancestor(child, parent) {
            return Err(ModelError::Cycle);
        }
        let index = match index {
            Some(i) => i,
            None => {
                let mut i = self.child_count(parent);
                if self.parent(child) == Some(parent) {
                    i -= 1;
                }
                i
            }
        };
        self.remove_from_parent(child);
        self.cells[child.index()].parent = Some(parent);
        let siblings = &mut self.cells[parent.index()].children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        Ok(child)
    }

    /// Removes and returns the child at `index`, clearing its parent link. Out-of-range
    /// indices are a no-op.
    pub fn remove_child_at(&mut self, parent: CellId, index: usize) -> Option<CellId> {
        if index >= self.child_count(parent) {
            return None;
        }
        let child = self.cells[parent.index()].children.remove(index);
        self.cells[child.index()].parent = None;
        Some(child)
    }

    pub fn remove_from_parent(&mut self, cell: CellId) {
        if let Some(parent) = self.cells[cell.index()].parent.take() {
            self.cells[parent.index()].children.retain(|&c| c != cell);
        }
    }

    /// First common ancestor of `a` and `b`, found by comparing hierarchy path prefixes
    /// while bubbling up from the deeper cell.
    pub fn nearest_common_ancestor(&self, a: CellId, b: CellId) -> Option<CellId> {
        let mut path = path::create(self, b);
        if path.is_empty() {
            return None;
        }
        let mut cell = a;
        let mut current = path::create(self, cell);
        if path.len() < current.len() {
            std::mem::swap(&mut path, &mut current);
            cell = b;
        }
        let mut cursor = Some(cell);
        while let Some(cell) = cursor {
            let parent = self.parent(cell);
            let prefix = format!("{current}{}", path::SEPARATOR);
            if path.starts_with(&prefix) && parent.is_some() {
                return Some(cell);
            }
            current = path::parent_path(&current).unwrap_or_default().to_string();
            cursor = parent;
        }
        None
    }

    // --- edge linkage ---

    pub fn terminal(&self, edge: CellId, is_source: bool) -> Option<CellId> {
        let cell = &self.cells[edge.index()];
        if is_source { cell.source } else { cell.target }
    }

    /// Sets or clears one end of an edge, keeping the terminal's reverse edge index in sync.
    pub fn set_terminal(&mut self, edge: CellId, terminal: Option<CellId>, is_source: bool) {
        match terminal {
            Some(terminal) => self.connect_terminal(terminal, edge, is_source),
            None => {
                if let Some(previous) = self.terminal(edge, is_source) {
                    self.disconnect_terminal(previous, edge, is_source);
                }
            }
        }
    }

    /// Connects `edge`'s outgoing or incoming end to `terminal`, disconnecting any previous
    /// terminal on that side. The edge is appended to the terminal's edge list unless it is
    /// already present and still mutually connected.
    pub fn connect_terminal(&mut self, terminal: CellId, edge: CellId, outgoing: bool) {
        if let Some(previous) = self.terminal(edge, outgoing) {
            self.disconnect_terminal(previous, edge, outgoing);
        }
        if outgoing {
            self.cells[edge.index()].source = Some(terminal);
        } else {
            self.cells[edge.index()].target = Some(terminal);
        }
        let other = self.terminal(edge, !outgoing);
        let list = &mut self.cells[terminal.index()].edges;
        if other != Some(terminal) || !list.contains(&edge) {
            list.push(edge);
        }
    }

    /// Clears one end of `edge` at `terminal`. The edge stays in the terminal's edge list
    /// while its other end still points there (self-loop protection).
    pub fn disconnect_terminal(&mut self, terminal: CellId, edge: CellId, outgoing: bool) {
        let other = self.terminal(edge, !outgoing);
        if other != Some(terminal) {
            let list = &mut self.cells[terminal.index()].edges;
            if let Some(pos) = list.iter().position(|&e| e == edge) {
                list.remove(pos);
            }
        }
        if outgoing {
            self.cells[edge.index()].source = None;
        } else {
            self.cells[edge.index()].target = None;
        }
    }

    pub fn edges_of(&self, cell: CellId) -> &[CellId] {
        &self.cells[cell.index()].edges
    }

    /// Incident edges filtered by terminal role. Loops are edges with both ends at `cell`.
    pub fn edge_connections(
        &self,
        cell: CellId,
        incoming: bool,
        outgoing: bool,
        include_loops: bool,
    ) -> Vec<CellId> {
        let mut out = Vec::new();
        for &edge in self.edges_of(cell) {
            let source = self.terminal(edge, true);
            let target = self.terminal(edge, false);
            let is_loop = source == Some(cell) && target == Some(cell);
            if is_loop {
                if include_loops {
                    out.push(edge);
                }
            } else if (incoming && target == Some(cell)) || (outgoing && source == Some(cell)) {
                out.push(edge);
            }
        }
        out
    }

    // --- traversal ---

    /// Pre-order traversal collecting `cell` (when the filter passes) and its descendants.
    pub fn filter_descendants(
        &self,
        cell: CellId,
        filter: Option<&dyn Fn(&Model, CellId) -> bool>,
    ) -> Vec<CellId> {
        let mut out = Vec::new();
        self.filter_descendants_into(cell, filter, &mut out);
        out
    }

    fn filter_descendants_into(
        &self,
        cell: CellId,
        filter: Option<&dyn Fn(&Model, CellId) -> bool>,
        out: &mut Vec<CellId>,
    ) {
        if filter.is_none_or(|f| f(self, cell)) {
            out.push(cell);
        }
        for &child in self.children(cell) {
            self.filter_descendants_into(child, filter, out);
        }
    }

    /// The cell itself plus all transitive children, in document order.
    pub fn descendants(&self, cell: CellId) -> Vec<CellId> {
        self.filter_descendants(cell, None)
    }

    /// Structural clone of a cell's record: flags, style, geometry and payload are copied,
    /// identity and linkage (id, parent, terminals, children, edges) are left for the caller
    /// to rebuild.
    pub fn clone_cell_record(&self, id: CellId) -> Cell {
        let src = &self.cells[id.index()];
        Cell {
            id: None,
            value: src.value.clone(),
            geometry: src.geometry.clone(),
            style: src.style.clone(),
            vertex: src.vertex,
            edge: src.edge,
            connectable: src.connectable,
            visible: src.visible,
            collapsed: src.collapsed,
            parent: None,
            children: Vec::new(),
            source: None,
            target: None,
            edges: Vec::new(),
        }
    }
}
