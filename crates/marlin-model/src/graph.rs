//! The transactional mutation engine.
//!
//! `Graph` wraps a [`Model`] with the batch API external layers call: add/remove/move/resize/
//! clone plus the geometry constraint passes (parent extension, child containment). Invalid
//! input degrades to a no-op rather than an error; capability predicates filter cells out of
//! an operation before any mutation happens.

use crate::cell::{Cell, CellId};
use crate::event::{EventSink, GraphEvent};
use crate::geometry::{Geometry, Point, Rect};
use crate::model::Model;
use crate::style::{self, Style, keys};
use crate::topology;
use crate::view::{CellStyleResolver, StyleResolver, View};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

const DEFAULT_GRID_SIZE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

pub struct Graph {
    pub model: Model,
    style_resolver: Box<dyn StyleResolver>,
    view: Option<Box<dyn View>>,
    listeners: Vec<Box<dyn EventSink>>,
    selection: Vec<CellId>,
    update_level: u32,

    pub cells_locked: bool,
    pub cells_movable: bool,
    pub cells_resizable: bool,
    pub cells_bendable: bool,
    pub cells_cloneable: bool,
    pub cells_deletable: bool,
    pub cells_selectable: bool,
    pub extend_parents: bool,
    pub extend_parents_on_add: bool,
    pub extend_parents_on_move: bool,
    pub constrain_children: bool,
    pub constrain_relative_children: bool,
    pub allow_negative_coordinates: bool,
    pub allow_overlap_parent: bool,
    pub default_overlap: f64,
    pub auto_size_cells: bool,
    pub auto_size_cells_on_add: bool,
    pub reset_edges_on_move: bool,
    pub reset_edges_on_resize: bool,
    pub disconnect_on_move: bool,
    pub allow_dangling_edges: bool,
    pub recursive_resize: bool,
    pub import_enabled: bool,
    pub export_enabled: bool,
    pub maximum_graph_bounds: Option<Rect>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::with_model(Model::new())
    }

    pub fn with_model(model: Model) -> Self {
        Self {
            model,
            style_resolver: Box::new(CellStyleResolver),
            view: None,
            listeners: Vec::new(),
            selection: Vec::new(),
            update_level: 0,
            cells_locked: false,
            cells_movable: true,
            cells_resizable: true,
            cells_bendable: true,
            cells_cloneable: true,
            cells_deletable: true,
            cells_selectable: true,
            extend_parents: true,
            extend_parents_on_add: true,
            extend_parents_on_move: false,
            constrain_children: true,
            constrain_relative_children: false,
            allow_negative_coordinates: true,
            allow_overlap_parent: false,
            default_overlap: 0.5,
            auto_size_cells: false,
            auto_size_cells_on_add: false,
            reset_edges_on_move: false,
            reset_edges_on_resize: false,
            disconnect_on_move: true,
            allow_dangling_edges: true,
            recursive_resize: false,
            import_enabled: true,
            export_enabled: true,
            maximum_graph_bounds: None,
        }
    }

    pub fn set_style_resolver(&mut self, resolver: Box<dyn StyleResolver>) {
        self.style_resolver = resolver;
    }

    pub fn set_view(&mut self, view: Box<dyn View>) {
        self.view = Some(view);
    }

    pub fn add_listener(&mut self, sink: Box<dyn EventSink>) {
        self.listeners.push(sink);
    }

    fn fire(&mut self, event: GraphEvent) {
        for listener in &mut self.listeners {
            listener.fire(&event);
        }
    }

    // --- transactions ---

    pub fn begin_update(&mut self) {
        self.update_level += 1;
        trace!(level = self.update_level, "begin update");
    }

    pub fn end_update(&mut self) {
        self.update_level = self.update_level.saturating_sub(1);
        trace!(level = self.update_level, "end update");
    }

    pub fn update_level(&self) -> u32 {
        self.update_level
    }

    /// Runs `f` bracketed by one begin/end pair so observers see a single coherent batch.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.begin_update();
        let out = f(self);
        self.end_update();
        out
    }

    // --- styles and capabilities ---

    pub fn current_cell_style(&self, cell: CellId) -> Style {
        self.style_resolver.resolve(&self.model, cell)
    }

    pub fn is_cell_locked(&self, cell: CellId) -> bool {
        // Relative-geometry vertices (edge labels) move with their edge, never by hand.
        self.cells_locked
            || (self.model.is_vertex(cell)
                && self.model.geometry(cell).is_some_and(|g| g.relative))
    }

    pub fn is_cell_movable(&self, cell: CellId) -> bool {
        self.cells_movable
            && !self.is_cell_locked(cell)
            && style::get_bool(&self.current_cell_style(cell), keys::MOVABLE, true)
    }

    pub fn is_cell_resizable(&self, cell: CellId) -> bool {
        self.cells_resizable
            && !self.is_cell_locked(cell)
            && style::get_bool(&self.current_cell_style(cell), keys::RESIZABLE, true)
    }

    pub fn is_cell_bendable(&self, cell: CellId) -> bool {
        self.cells_bendable
            && !self.is_cell_locked(cell)
            && style::get_bool(&self.current_cell_style(cell), keys::BENDABLE, true)
    }

    pub fn is_cell_cloneable(&self, cell: CellId) -> bool {
        self.cells_cloneable
            && style::get_bool(&self.current_cell_style(cell), keys::CLONEABLE, true)
    }

    pub fn is_cell_deletable(&self, cell: CellId) -> bool {
        self.cells_deletable
            && style::get_bool(&self.current_cell_style(cell), keys::DELETABLE, true)
    }

    pub fn is_cell_selectable(&self, _cell: CellId) -> bool {
        self.cells_selectable
    }

    pub fn is_cell_rotatable(&self, cell: CellId) -> bool {
        style::get_bool(&self.current_cell_style(cell), keys::ROTATABLE, true)
    }

    pub fn is_auto_size_cell(&self, cell: CellId) -> bool {
        self.auto_size_cells
            || style::get_bool(&self.current_cell_style(cell), keys::AUTOSIZE, false)
    }

    pub fn is_swimlane(&self, cell: CellId) -> bool {
        style::get_str(&self.current_cell_style(cell), keys::SHAPE) == Some(style::SHAPE_SWIMLANE)
    }

    /// Header size reserved by a swimlane, as a (width, height) pair: horizontal lanes
    /// reserve a top row, vertical lanes a left column.
    pub fn start_size(&self, swimlane: CellId) -> (f64, f64) {
        let cell_style = self.current_cell_style(swimlane);
        let size = style::get_f64(&cell_style, keys::STARTSIZE, style::DEFAULT_STARTSIZE);
        if style::get_bool(&cell_style, keys::HORIZONTAL, true) {
            (0.0, size)
        } else {
            (size, 0.0)
        }
    }

    pub fn movable_cells(&self, cells: &[CellId]) -> Vec<CellId> {
        cells
            .iter()
            .copied()
            .filter(|&c| self.is_cell_movable(c))
            .collect()
    }

    pub fn deletable_cells(&self, cells: &[CellId]) -> Vec<CellId> {
        cells
            .iter()
            .copied()
            .filter(|&c| self.is_cell_deletable(c))
            .collect()
    }

    pub fn cloneable_cells(&self, cells: &[CellId]) -> Vec<CellId> {
        cells
            .iter()
            .copied()
            .filter(|&c| self.is_cell_cloneable(c))
            .collect()
    }

    pub fn exportable_cells(&self, cells: &[CellId]) -> Vec<CellId> {
        if self.export_enabled {
            cells.to_vec()
        } else {
            Vec::new()
        }
    }

    pub fn importable_cells(&self, cells: &[CellId]) -> Vec<CellId> {
        if self.import_enabled {
            cells.to_vec()
        } else {
            Vec::new()
        }
    }

    // --- selection ---

    pub fn selection_cells(&self) -> &[CellId] {
        &self.selection
    }

    pub fn set_selection_cells(&mut self, cells: Vec<CellId>) {
        self.selection = cells
            .into_iter()
            .filter(|&c| self.is_cell_selectable(c))
            .collect();
    }

    pub fn set_selection_cell(&mut self, cell: CellId) {
        self.set_selection_cells(vec![cell]);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_cell_selected(&self, cell: CellId) -> bool {
        self.selection.contains(&cell)
    }

    // --- read helpers ---

    pub fn default_parent(&self) -> CellId {
        self.model.default_parent()
    }

    pub fn child_cells(&self, parent: CellId, vertices: bool, edges: bool) -> Vec<CellId> {
        self.model
            .children(parent)
            .iter()
            .copied()
            .filter(|&c| {
                (vertices && self.model.is_vertex(c)) || (edges && self.model.is_edge(c))
            })
            .collect()
    }

    pub fn child_vertices(&self, parent: CellId) -> Vec<CellId> {
        self.child_cells(parent, true, false)
    }

    pub fn child_edges(&self, parent: CellId) -> Vec<CellId> {
        self.child_cells(parent, false, true)
    }

    /// Incident edges of `cell`, loops excluded.
    pub fn connections(&self, cell: CellId) -> Vec<CellId> {
        self.model.edge_connections(cell, true, true, false)
    }

    pub fn opposites(&self, edges: &[CellId], terminal: CellId) -> Vec<CellId> {
        topology::opposites(&self.model, edges, terminal, true, true)
    }

    /// Edges incident to the given cells or any of their descendants, de-duplicated.
    pub fn all_edges(&self, cells: &[CellId]) -> Vec<CellId> {
        let mut out = Vec::new();
        let mut seen: FxHashSet<CellId> = FxHashSet::default();
        for &cell in cells {
            for &d in &self.model.descendants(cell) {
                for &edge in self.model.edges_of(d) {
                    if seen.insert(edge) {
                        out.push(edge);
                    }
                }
            }
        }
        out
    }

    fn add_all_edges(&self, cells: &[CellId]) -> Vec<CellId> {
        let mut out = cells.to_vec();
        let mut seen: FxHashSet<CellId> = cells.iter().copied().collect();
        for edge in self.all_edges(cells) {
            if seen.insert(edge) {
                out.push(edge);
            }
        }
        out
    }

    /// Absolute origin of a cell's coordinate system, in model units. Uses the rendered
    /// state when a view is installed (dividing out its scale and translation), otherwise
    /// the sum of non-relative ancestor offsets.
    fn origin(&self, cell: Option<CellId>) -> Point {
        if let (Some(view), Some(cell)) = (&self.view, cell) {
            if let Some(state) = view.state(&self.model, cell) {
                let scale = view.scale();
                let tr = view.translate();
                return Point::new(
                    state.bounds.x / scale - tr.x,
                    state.bounds.y / scale - tr.y,
                );
            }
        }
        let mut pt = Point::ZERO;
        let mut cur = cell;
        while let Some(c) = cur {
            if let Some(geo) = self.model.geometry(c) {
                if !geo.relative {
                    pt.x += geo.x;
                    pt.y += geo.y;
                }
            }
            cur = self.model.parent(c);
        }
        pt
    }

    fn is_cell_state_visible(&self, cell: CellId) -> bool {
        if let Some(view) = &self.view {
            return view.state(&self.model, cell).is_some();
        }
        let mut cur = Some(cell);
        while let Some(c) = cur {
            if !self.model.is_visible(c) {
                return false;
            }
            cur = self.model.parent(c);
        }
        true
    }

    /// Bounding box of the raw geometries of the given cells. Edge routes contribute their
    /// waypoints and explicit terminal points; relative vertices are resolved against their
    /// parent's box.
    pub fn bounding_box_from_geometry(
        &self,
        cells: &[CellId],
        include_edges: bool,
    ) -> Option<Rect> {
        let mut result: Option<Rect> = None;
        for &cell in cells {
            if !include_edges && !self.model.is_vertex(cell) {
                continue;
            }
            let Some(geo) = self.model.geometry(cell) else {
                continue;
            };
            let bbox = if self.model.is_edge(cell) {
                let mut pts = geo.points.clone();
                if let Some(pt) = geo.source_point {
                    pts.push(pt);
                }
                if let Some(pt) = geo.target_point {
                    pts.push(pt);
                }
                match Rect::from_points(&pts) {
                    Some(r) => r,
                    None => continue,
                }
            } else if geo.relative {
                let parent_geo = self
                    .model
                    .parent(cell)
                    .and_then(|p| self.model.geometry(p));
                let offset = geo.offset.unwrap_or(Point::ZERO);
                match parent_geo {
                    Some(pg) => Rect::new(
                        pg.width * geo.x + offset.x,
                        pg.height * geo.y + offset.y,
                        geo.width,
                        geo.height,
                    ),
                    None => Rect::new(offset.x, offset.y, geo.width, geo.height),
                }
            } else {
                geo.rect()
            };
            result = Some(match result {
                Some(r) => r.union(&bbox),
                None => bbox,
            });
        }
        result
    }

    // --- cell builders ---

    pub fn insert_vertex(
        &mut self,
        parent: CellId,
        id: Option<&str>,
        value: Option<serde_json::Value>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        cell_style: Style,
    ) -> CellId {
        let mut cell = Cell::vertex(Geometry::new(x, y, width, height));
        cell.id = id.map(str::to_string);
        cell.value = value;
        cell.style = cell_style;
        let cell = self.model.create(cell);
        self.add_cell(cell, Some(parent), None, None, None);
        cell
    }

    pub fn insert_edge(
        &mut self,
        parent: CellId,
        id: Option<&str>,
        value: Option<serde_json::Value>,
        source: Option<CellId>,
        target: Option<CellId>,
        cell_style: Style,
    ) -> CellId {
        let mut cell = Cell::edge();
        cell.id = id.map(str::to_string);
        cell.value = value;
        cell.style = cell_style;
        let cell = self.model.create(cell);
        self.add_cell(cell, Some(parent), None, source, target);
        cell
    }

    // --- add ---

    pub fn add_cell(
        &mut self,
        cell: CellId,
        parent: Option<CellId>,
        index: Option<usize>,
        source: Option<CellId>,
        target: Option<CellId>,
    ) -> CellId {
        self.add_cells(&[cell], parent, index, source, target, false);
        cell
    }

    /// Inserts cells under `parent` at `index`, wiring up optional terminals. With
    /// `absolute`, each cell's geometry is first translated by the origin difference between
    /// its old and new parent so it keeps its absolute position.
    pub fn add_cells(
        &mut self,
        cells: &[CellId],
        parent: Option<CellId>,
        index: Option<usize>,
        source: Option<CellId>,
        target: Option<CellId>,
        absolute: bool,
    ) -> Vec<CellId> {
        let parent = parent.unwrap_or_else(|| self.default_parent());
        let index = index.unwrap_or_else(|| self.model.child_count(parent));
        self.begin_update();
        self.cells_added(cells, parent, index, source, target, absolute, true);
        self.fire(GraphEvent::CellsAdded {
            cells: cells.to_vec(),
            parent,
            index,
            source,
            target,
            absolute,
        });
        self.end_update();
        cells.to_vec()
    }

    fn cells_added(
        &mut self,
        cells: &[CellId],
        parent: CellId,
        index: usize,
        source: Option<CellId>,
        target: Option<CellId>,
        absolute: bool,
        constrain: bool,
    ) {
        let parent_origin = if absolute {
            Some(self.origin(Some(parent)))
        } else {
            None
        };
        let mut index = index;
        for (i, &cell) in cells.iter().enumerate() {
            let previous = self.model.parent(cell);
            // Keeps the cell at its absolute location.
            if let Some(o1) = parent_origin {
                if cell != parent && previous != Some(parent) {
                    let o2 = self.origin(previous);
                    if let Some(mut geo) = self.model.geometry(cell).cloned() {
                        geo.translate(o2.x - o1.x, o2.y - o1.y);
                        if !geo.relative
                            && self.model.is_vertex(cell)
                            && !self.allow_negative_coordinates
                        {
                            geo.x = geo.x.max(0.0);
                            geo.y = geo.y.max(0.0);
                        }
                        self.model.set_geometry(cell, Some(geo));
                    }
                }
            }
            // Decrements all following indices if the cell is already a child of the parent.
            if previous == Some(parent) && index + i > self.model.child_count(parent) {
                index -= 1;
            }
            self.model.insert_child(parent, cell, Some(index + i));
            if self.auto_size_cells_on_add {
                self.auto_size_cell(cell, true);
            }
            if self.extend_parents_on_add && self.is_extend_parent(cell) {
                self.extend_parent(cell);
            }
            if constrain {
                self.constrain_child(cell);
            }
            if source.is_some() {
                self.cell_connected(cell, source, true);
            }
            if target.is_some() {
                self.cell_connected(cell, target, false);
            }
        }
    }

    fn cell_connected(&mut self, edge: CellId, terminal: Option<CellId>, is_source: bool) {
        self.model.set_terminal(edge, terminal, is_source);
    }

    fn is_extend_parent(&self, cell: CellId) -> bool {
        !self.model.is_edge(cell) && self.extend_parents
    }

    // --- remove ---

    /// Removes the cells (default: the deletable part of the selection). With
    /// `include_edges` the set is expanded to every edge touching a removed cell; otherwise
    /// only edges already invisible are swept along. Edges that survive but touch a removed
    /// cell are disconnected on that side with an explicit terminal point so their route
    /// stays where it was.
    pub fn remove_cells(&mut self, cells: Option<Vec<CellId>>, include_edges: bool) -> Vec<CellId> {
        let mut cells = match cells {
            Some(cells) => cells,
            None => {
                let selection = self.selection.clone();
                self.deletable_cells(&selection)
            }
        };
        if include_edges {
            cells = self.deletable_cells(&self.add_all_edges(&cells));
        } else {
            let edges = self.deletable_cells(&self.all_edges(&cells));
            let mut seen: FxHashSet<CellId> = cells.iter().copied().collect();
            for edge in edges {
                if !seen.contains(&edge) && !self.is_cell_state_visible(edge) {
                    seen.insert(edge);
                    cells.push(edge);
                }
            }
        }
        self.begin_update();
        self.cells_removed(&cells);
        self.fire(GraphEvent::CellsRemoved {
            cells: cells.clone(),
        });
        self.end_update();
        self.selection.retain(|c| !cells.contains(c));
        cells
    }

    fn cells_removed(&mut self, cells: &[CellId]) {
        if cells.is_empty() {
            return;
        }
        let removed: FxHashSet<CellId> = cells.iter().copied().collect();
        for &cell in cells {
            // Disconnects surviving edges before their terminal disappears.
            let edges = self.model.edges_of(cell).to_vec();
            for edge in edges {
                if !removed.contains(&edge) {
                    self.disconnect_edge_from_removed(cell, edge);
                }
            }
            // A removed edge releases its surviving terminals so their edge lists stay live.
            if self.model.is_edge(cell) {
                for is_source in [true, false] {
                    if let Some(terminal) = self.model.terminal(cell, is_source) {
                        if !removed.contains(&terminal) {
                            self.model.set_terminal(cell, None, is_source);
                        }
                    }
                }
            }
            self.model.remove_from_parent(cell);
        }
    }

    fn disconnect_edge_from_removed(&mut self, removed: CellId, edge: CellId) {
        for is_source in [true, false] {
            if self.model.terminal(edge, is_source) == Some(removed) {
                let pt = self.edge_endpoint(edge, removed, is_source);
                if let Some(mut geo) = self.model.geometry(edge).cloned() {
                    geo.set_terminal_point(Some(pt), is_source);
                    self.model.set_geometry(edge, Some(geo));
                }
                self.model.set_terminal(edge, None, is_source);
            }
        }
    }

    /// Where the given end of `edge` sits, in the coordinates of the edge's parent: the
    /// rendered route when a view is installed, else the terminal's absolute center.
    fn edge_endpoint(&self, edge: CellId, terminal: CellId, is_source: bool) -> Point {
        let parent_origin = self.origin(self.model.parent(edge));
        if let Some(view) = &self.view {
            if let Some(state) = view.state(&self.model, edge) {
                let pt = if is_source {
                    state.absolute_points.first().copied()
                } else {
                    state.absolute_points.last().copied()
                };
                if let Some(pt) = pt {
                    let scale = view.scale();
                    let tr = view.translate();
                    return Point::new(
                        pt.x / scale - tr.x - parent_origin.x,
                        pt.y / scale - tr.y - parent_origin.y,
                    );
                }
            }
        }
        let origin = self.origin(Some(terminal));
        let (cx, cy) = self
            .model
            .geometry(terminal)
            .map_or((0.0, 0.0), |g| (g.width / 2.0, g.height / 2.0));
        Point::new(
            origin.x + cx - parent_origin.x,
            origin.y + cy - parent_origin.y,
        )
    }

    // --- move ---

    /// Moves (or clones and moves) the topmost cells of the given set by the delta,
    /// optionally re-parenting them into `target`. Relative edge labels whose edge moves
    /// anyway are excluded; while re-parenting, negative-coordinate clamping is suspended so
    /// cells may pass through negative local coordinates before normalization.
    pub fn move_cells(
        &mut self,
        cells: &[CellId],
        dx: f64,
        dy: f64,
        clone: bool,
        target: Option<CellId>,
        mapping: Option<&mut FxHashMap<CellId, CellId>>,
    ) -> Vec<CellId> {
        if cells.is_empty() || (dx == 0.0 && dy == 0.0 && !clone && target.is_none()) {
            return cells.to_vec();
        }
        let mut cells = topology::topmost_cells(&self.model, cells);
        let moved = cells.clone();
        self.begin_update();
        let members: FxHashSet<CellId> = cells.iter().copied().collect();
        cells.retain(|&cell| {
            let is_relative_label = self.model.geometry(cell).is_some_and(|g| g.relative)
                && self
                    .model
                    .parent(cell)
                    .is_some_and(|p| self.model.is_edge(p));
            if !is_relative_label {
                return true;
            }
            // The label moves implicitly when one of its edge's terminals is selected.
            let parent = self.model.parent(cell);
            let terminal_selected = [true, false].into_iter().any(|s| {
                let mut cur = parent.and_then(|p| self.model.terminal(p, s));
                while let Some(c) = cur {
                    if members.contains(&c) {
                        return true;
                    }
                    cur = self.model.parent(c);
                }
                false
            });
            !terminal_selected
        });
        let mut local_mapping = FxHashMap::default();
        let mapping = mapping.unwrap_or(&mut local_mapping);
        if clone {
            cells = self.clone_cells_mapped(&cells, mapping);
        }
        let target = if clone && target.is_none() {
            Some(self.default_parent())
        } else {
            target
        };
        let previous_allow = self.allow_negative_coordinates;
        if target.is_some() {
            self.allow_negative_coordinates = true;
        }
        let disconnect = !clone && self.disconnect_on_move && self.allow_dangling_edges;
        self.cells_moved_inner(
            &cells,
            dx,
            dy,
            disconnect,
            target.is_none(),
            self.extend_parents_on_move && target.is_none(),
        );
        self.allow_negative_coordinates = previous_allow;
        if let Some(target) = target {
            let index = self.model.child_count(target);
            self.cells_added(&cells, target, index, None, None, true, true);
        }
        self.fire(GraphEvent::CellsMoved {
            cells: moved,
            dx,
            dy,
            disconnect,
        });
        self.end_update();
        cells
    }

    /// Translates the cells without the topmost/clone/re-parent handling of
    /// [`move_cells`](Self::move_cells).
    pub fn cells_moved(
        &mut self,
        cells: &[CellId],
        dx: f64,
        dy: f64,
        disconnect: bool,
        constrain: bool,
        extend: bool,
    ) {
        self.cells_moved_inner(cells, dx, dy, disconnect, constrain, extend);
        self.fire(GraphEvent::CellsMoved {
            cells: cells.to_vec(),
            dx,
            dy,
            disconnect,
        });
    }

    fn cells_moved_inner(
        &mut self,
        cells: &[CellId],
        dx: f64,
        dy: f64,
        disconnect: bool,
        constrain: bool,
        extend: bool,
    ) {
        if cells.is_empty() || (dx == 0.0 && dy == 0.0) {
            return;
        }
        self.begin_update();
        if disconnect {
            self.disconnect_graph(cells);
        }
        for &cell in cells {
            self.translate_cell(cell, dx, dy);
            if extend && self.is_extend_parent(cell) {
                self.extend_parent(cell);
            } else if constrain {
                self.constrain_child(cell);
            }
        }
        if self.reset_edges_on_move {
            self.reset_edges(cells);
        }
        self.end_update();
    }

    /// Shifts one cell's geometry. Relative geometries accumulate the delta into the pixel
    /// offset, rotated into the parent's frame when the parent carries a rotation style.
    pub fn translate_cell(&mut self, cell: CellId, mut dx: f64, mut dy: f64) {
        let Some(mut geo) = self.model.geometry(cell).cloned() else {
            return;
        };
        geo.translate(dx, dy);
        if !geo.relative && self.model.is_vertex(cell) && !self.allow_negative_coordinates {
            geo.x = geo.x.max(0.0);
            geo.y = geo.y.max(0.0);
        }
        if geo.relative && !self.model.is_edge(cell) {
            let parent = self.model.parent(cell);
            let mut angle = 0.0;
            if let Some(parent) = parent {
                if self.model.is_vertex(parent) {
                    angle = style::get_f64(
                        &self.current_cell_style(parent),
                        keys::ROTATION,
                        0.0,
                    );
                }
            }
            if angle != 0.0 {
                let rad = (-angle).to_radians();
                let (cos, sin) = (rad.cos(), rad.sin());
                (dx, dy) = (dx * cos - dy * sin, dx * sin + dy * cos);
            }
            match &mut geo.offset {
                Some(offset) => {
                    offset.x += dx;
                    offset.y += dy;
                }
                None => geo.offset = Some(Point::new(dx, dy)),
            }
        }
        self.model.set_geometry(cell, Some(geo));
    }

    /// Disconnects edges in the set from terminals outside it, pinning each freed end with
    /// an explicit terminal point.
    fn disconnect_graph(&mut self, cells: &[CellId]) {
        let members: FxHashSet<CellId> = cells.iter().copied().collect();
        for &cell in cells {
            if !self.model.is_edge(cell) {
                continue;
            }
            for is_source in [true, false] {
                let Some(terminal) = self.model.terminal(cell, is_source) else {
                    continue;
                };
                let mut cur = Some(terminal);
                let mut inside = false;
                while let Some(c) = cur {
                    if members.contains(&c) {
                        inside = true;
                        break;
                    }
                    cur = self.model.parent(c);
                }
                if inside {
                    continue;
                }
                let pt = self.edge_endpoint(cell, terminal, is_source);
                if let Some(mut geo) = self.model.geometry(cell).cloned() {
                    geo.set_terminal_point(Some(pt), is_source);
                    self.model.set_geometry(cell, Some(geo));
                }
                self.model.set_terminal(cell, None, is_source);
            }
        }
    }

    /// Clears routed waypoints of edges that connect the given cells to the outside.
    fn reset_edges(&mut self, cells: &[CellId]) {
        let members: FxHashSet<CellId> = cells.iter().copied().collect();
        for &cell in cells {
            for edge in self.model.edges_of(cell).to_vec() {
                let source = self.model.terminal(edge, true);
                let target = self.model.terminal(edge, false);
                let both_inside = source.is_some_and(|s| members.contains(&s))
                    && target.is_some_and(|t| members.contains(&t));
                if !both_inside {
                    self.reset_edge(edge);
                }
            }
        }
    }

    pub fn reset_edge(&mut self, edge: CellId) {
        if let Some(mut geo) = self.model.geometry(edge).cloned() {
            if !geo.points.is_empty() {
                geo.points.clear();
                self.model.set_geometry(edge, Some(geo));
            }
        }
    }

    // --- clone ---

    pub fn clone_cell(&mut self, cell: CellId) -> Option<CellId> {
        self.clone_cells(&[cell]).first().copied()
    }

    /// Deep clones the cloneable part of the set, children included, preserving internal
    /// edge topology.
    pub fn clone_cells(&mut self, cells: &[CellId]) -> Vec<CellId> {
        let mut mapping = FxHashMap::default();
        self.clone_cells_mapped(cells, &mut mapping)
    }

    pub fn clone_cells_mapped(
        &mut self,
        cells: &[CellId],
        mapping: &mut FxHashMap<CellId, CellId>,
    ) -> Vec<CellId> {
        let cloneable = self.cloneable_cells(cells);
        topology::clone_cells(&mut self.model, &cloneable, true, mapping)
    }

    // --- resize ---

    pub fn resize_cell(&mut self, cell: CellId, bounds: Rect) -> CellId {
        self.resize_cells(&[cell], &[bounds], self.recursive_resize);
        cell
    }

    /// Applies new bounds pairwise. Mismatched array lengths are a silent no-op. With
    /// `recurse`, children are rescaled by the width/height ratio first.
    pub fn resize_cells(
        &mut self,
        cells: &[CellId],
        bounds: &[Rect],
        recurse: bool,
    ) -> Vec<CellId> {
        if cells.len() != bounds.len() {
            return cells.to_vec();
        }
        self.begin_update();
        let previous = self.cells_resized_inner(cells, bounds, recurse);
        self.fire(GraphEvent::CellsResized {
            cells: cells.to_vec(),
            bounds: bounds.to_vec(),
            previous,
        });
        self.end_update();
        cells.to_vec()
    }

    fn cells_resized_inner(
        &mut self,
        cells: &[CellId],
        bounds: &[Rect],
        recurse: bool,
    ) -> Vec<Option<Geometry>> {
        let mut previous = Vec::new();
        if cells.len() != bounds.len() {
            return previous;
        }
        self.begin_update();
        for (&cell, &rect) in cells.iter().zip(bounds) {
            previous.push(self.cell_resized(cell, rect, false, recurse));
            if self.is_extend_parent(cell) {
                self.extend_parent(cell);
            }
            self.constrain_child(cell);
        }
        if self.reset_edges_on_resize {
            self.reset_edges(cells);
        }
        self.end_update();
        previous
    }

    fn cell_resized(
        &mut self,
        cell: CellId,
        bounds: Rect,
        ignore_relative: bool,
        recurse: bool,
    ) -> Option<Geometry> {
        let previous = self.model.geometry(cell).cloned();
        let Some(prev_geo) = &previous else {
            return previous;
        };
        if prev_geo.x == bounds.x
            && prev_geo.y == bounds.y
            && prev_geo.width == bounds.width
            && prev_geo.height == bounds.height
        {
            return previous;
        }
        let mut geo = prev_geo.clone();
        if !ignore_relative && geo.relative {
            if let Some(offset) = &mut geo.offset {
                offset.x += bounds.x - geo.x;
                offset.y += bounds.y - geo.y;
            }
        } else {
            geo.x = bounds.x;
            geo.y = bounds.y;
        }
        geo.width = bounds.width;
        geo.height = bounds.height;
        if !geo.relative && self.model.is_vertex(cell) && !self.allow_negative_coordinates {
            geo.x = geo.x.max(0.0);
            geo.y = geo.y.max(0.0);
        }
        self.begin_update();
        if recurse {
            self.resize_child_cells(cell, &geo);
        }
        self.model.set_geometry(cell, Some(geo));
        self.constrain_child_cells(cell);
        self.end_update();
        previous
    }

    fn resize_child_cells(&mut self, cell: CellId, new_geo: &Geometry) {
        let Some(geo) = self.model.geometry(cell).cloned() else {
            return;
        };
        let sx = if geo.width != 0.0 {
            new_geo.width / geo.width
        } else {
            1.0
        };
        let sy = if geo.height != 0.0 {
            new_geo.height / geo.height
        } else {
            1.0
        };
        for child in self.model.children(cell).to_vec() {
            self.scale_cell(child, sx, sy, true);
        }
    }

    /// Scales one cell's geometry, respecting the aspect style and the movable/resizable
    /// capabilities.
    pub fn scale_cell(&mut self, cell: CellId, sx: f64, sy: f64, recurse: bool) {
        let Some(mut geo) = self.model.geometry(cell).cloned() else {
            return;
        };
        let cell_style = self.current_cell_style(cell);
        let (x, y, w, h) = (geo.x, geo.y, geo.width, geo.height);
        geo.scale(
            sx,
            sy,
            style::get_str(&cell_style, keys::ASPECT) == Some("fixed"),
        );
        if !self.is_cell_movable(cell) {
            geo.x = x;
            geo.y = y;
        }
        if !self.is_cell_resizable(cell) {
            geo.width = w;
            geo.height = h;
        }
        if self.model.is_vertex(cell) {
            self.cell_resized(cell, geo.rect(), true, recurse);
        } else {
            self.model.set_geometry(cell, Some(geo));
        }
    }

    fn constrain_child_cells(&mut self, cell: CellId) {
        for child in self.model.children(cell).to_vec() {
            self.constrain_child(child);
        }
    }

    // --- containment ---

    fn is_constrain_child(&self, cell: CellId) -> bool {
        self.constrain_children
            && !self
                .model
                .parent(cell)
                .is_some_and(|p| self.model.is_edge(p))
    }

    fn overlap(&self, _cell: CellId) -> f64 {
        if self.allow_overlap_parent {
            self.default_overlap
        } else {
            0.0
        }
    }

    /// The rectangle a child may occupy: its parent's interior minus any swimlane header.
    /// `None` for edges, top-level cells and geometry-less parents.
    pub fn cell_containment_area(&self, cell: CellId) -> Option<Rect> {
        if self.model.is_edge(cell) {
            return None;
        }
        let parent = self.model.parent(cell)?;
        if parent == self.default_parent() || parent == self.model.root() {
            return None;
        }
        let geo = self.model.geometry(parent)?;
        let (mut x, mut y, mut w, mut h) = (0.0, 0.0, geo.width, geo.height);
        if self.is_swimlane(parent) {
            let (sw, sh) = self.start_size(parent);
            x = sw;
            y = sh;
            w -= sw;
            h -= sh;
        }
        Some(Rect::new(x, y, w, h))
    }

    /// Nudges (and if necessary shrinks) the cell so the bounding box of it and its visible
    /// descendants fits the intersection of the maximum graph bounds and its overlap-inflated
    /// containment area. Already-contained cells are untouched.
    pub fn constrain_child(&mut self, cell: CellId) {
        let Some(geo) = self.model.geometry(cell).cloned() else {
            return;
        };
        if geo.relative && !self.constrain_relative_children {
            return;
        }
        let parent = self.model.parent(cell);
        let mut max = self.maximum_graph_bounds;
        // The maximum bounds are absolute; shift them into the parent's frame.
        if let Some(m) = &mut max {
            if let Some(parent) = parent {
                if let Some(off) = self.bounding_box_from_geometry(&[parent], false) {
                    m.x -= off.x;
                    m.y -= off.y;
                }
            }
        }
        if self.is_constrain_child(cell) {
            if let Some(mut area) = self.cell_containment_area(cell) {
                let overlap = self.overlap(cell);
                if overlap > 0.0 {
                    area.x -= area.width * overlap;
                    area.y -= area.height * overlap;
                    area.width += 2.0 * area.width * overlap;
                    area.height += 2.0 * area.height * overlap;
                }
                max = Some(match max {
                    Some(m) => m.intersection(&area),
                    None => area,
                });
            }
        }
        let Some(max) = max else {
            return;
        };
        let mut cells = vec![cell];
        if !self.model.is_collapsed(cell) {
            for d in self.model.descendants(cell) {
                if d != cell && self.model.is_visible(d) {
                    cells.push(d);
                }
            }
        }
        let Some(bbox) = self.bounding_box_from_geometry(&cells, false) else {
            return;
        };
        let mut geo = geo;
        let mut shrunk = false;
        // Cumulative horizontal movement, shrinking the cell first if it alone is too wide.
        let mut dx = 0.0;
        if geo.width > max.width {
            dx = geo.width - max.width;
            geo.width -= dx;
            shrunk = true;
        }
        if bbox.x + bbox.width > max.x + max.width {
            dx -= bbox.x + bbox.width - max.x - max.width - dx;
        }
        // Cumulative vertical movement.
        let mut dy = 0.0;
        if geo.height > max.height {
            dy = geo.height - max.height;
            geo.height -= dy;
            shrunk = true;
        }
        if bbox.y + bbox.height > max.y + max.height {
            dy -= bbox.y + bbox.height - max.y - max.height - dy;
        }
        if bbox.x < max.x {
            dx -= bbox.x - max.x;
        }
        if bbox.y < max.y {
            dy -= bbox.y - max.y;
        }
        if dx != 0.0 || dy != 0.0 {
            if geo.relative {
                let offset = geo.offset.get_or_insert(Point::ZERO);
                offset.x += dx;
                offset.y += dy;
            } else {
                geo.x += dx;
                geo.y += dy;
            }
            self.model.set_geometry(cell, Some(geo));
        } else if shrunk {
            self.model.set_geometry(cell, Some(geo));
        }
    }

    /// Grows the parent so a non-relative child's extent fits, re-entering the resize
    /// pipeline on the parent.
    pub fn extend_parent(&mut self, cell: CellId) {
        let Some(parent) = self.model.parent(cell) else {
            return;
        };
        let Some(mut parent_geo) = self.model.geometry(parent).cloned() else {
            return;
        };
        if self.model.is_collapsed(parent) {
            return;
        }
        let Some(geo) = self.model.geometry(cell) else {
            return;
        };
        if !geo.relative
            && (parent_geo.width < geo.x + geo.width || parent_geo.height < geo.y + geo.height)
        {
            parent_geo.width = parent_geo.width.max(geo.x + geo.width);
            parent_geo.height = parent_geo.height.max(geo.y + geo.height);
            let bounds = parent_geo.rect();
            self.cells_resized_inner(&[parent], &[bounds], false);
        }
    }

    // --- visibility / folding / ordering ---

    pub fn toggle_cells(
        &mut self,
        show: bool,
        cells: Option<Vec<CellId>>,
        include_edges: bool,
    ) -> Vec<CellId> {
        let mut cells = cells.unwrap_or_else(|| self.selection.clone());
        if include_edges {
            cells = self.add_all_edges(&cells);
        }
        self.begin_update();
        for &cell in &cells {
            self.model.set_visible(cell, show);
        }
        self.fire(GraphEvent::CellsToggled {
            cells: cells.clone(),
            show,
        });
        self.end_update();
        cells
    }

    pub fn foldable_cells(&self, cells: &[CellId], _collapse: bool) -> Vec<CellId> {
        cells
            .iter()
            .copied()
            .filter(|&c| self.model.child_count(c) > 0)
            .collect()
    }

    /// Collapses or expands cells, swapping in their alternate bounds where present.
    pub fn fold_cells(
        &mut self,
        collapse: bool,
        recurse: bool,
        cells: Option<Vec<CellId>>,
    ) -> Vec<CellId> {
        let cells = match cells {
            Some(cells) => cells,
            None => {
                let selection = self.selection.clone();
                self.foldable_cells(&selection, collapse)
            }
        };
        self.begin_update();
        self.cells_folded(&cells, collapse, recurse);
        self.fire(GraphEvent::CellsFolded {
            cells: cells.clone(),
            collapse,
        });
        self.end_update();
        cells
    }

    fn cells_folded(&mut self, cells: &[CellId], collapse: bool, recurse: bool) {
        for &cell in cells {
            if collapse != self.model.is_collapsed(cell) {
                self.model.set_collapsed(cell, collapse);
                if let Some(mut geo) = self.model.geometry(cell).cloned() {
                    geo.swap();
                    self.model.set_geometry(cell, Some(geo));
                }
                if self.constrain_children {
                    self.constrain_child(cell);
                }
                if recurse {
                    let children = self.model.children(cell).to_vec();
                    self.cells_folded(&children, collapse, recurse);
                }
            }
        }
    }

    /// Moves cells to the back or front of their parents' child lists. The batch is sorted
    /// by hierarchy path first so relative z-order inside the batch is preserved.
    pub fn order_cells(&mut self, back: bool, cells: Option<Vec<CellId>>) -> Vec<CellId> {
        let mut cells = cells.unwrap_or_else(|| self.selection.clone());
        cells.sort_by(|&a, &b| {
            crate::path::compare(
                &crate::path::create(&self.model, a),
                &crate::path::create(&self.model, b),
            )
        });
        self.begin_update();
        for (i, &cell) in cells.iter().enumerate() {
            if let Some(parent) = self.model.parent(cell) {
                let index = if back {
                    i.min(self.model.child_count(parent).saturating_sub(1))
                } else {
                    self.model.child_count(parent).saturating_sub(1)
                };
                self.model.insert_child(parent, cell, Some(index));
            }
        }
        self.fire(GraphEvent::CellsOrdered {
            cells: cells.clone(),
            back,
        });
        self.end_update();
        cells
    }

    // --- alignment ---

    /// Aligns cells along the given axis. The anchor coordinate is taken from the first
    /// cell for center/middle and from the extremum of the batch otherwise.
    pub fn align_cells(&mut self, align: Align, cells: Option<Vec<CellId>>) -> Vec<CellId> {
        let cells = cells.unwrap_or_else(|| self.selection.clone());
        if cells.len() < 2 {
            return cells;
        }
        let mut param: Option<f64> = None;
        for &cell in &cells {
            if self.model.is_edge(cell) {
                continue;
            }
            let Some(geo) = self.model.geometry(cell) else {
                continue;
            };
            let value = match align {
                Align::Left => geo.x,
                Align::Center => geo.x + geo.width / 2.0,
                Align::Right => geo.x + geo.width,
                Align::Top => geo.y,
                Align::Middle => geo.y + geo.height / 2.0,
                Align::Bottom => geo.y + geo.height,
            };
            param = Some(match (param, align) {
                (None, _) => value,
                (Some(p), Align::Left | Align::Top) => p.min(value),
                (Some(p), Align::Right | Align::Bottom) => p.max(value),
                (Some(p), _) => p,
            });
            if matches!(align, Align::Center | Align::Middle) {
                break;
            }
        }
        let Some(param) = param else {
            return cells;
        };
        self.begin_update();
        for &cell in &cells {
            if self.model.is_edge(cell) {
                continue;
            }
            let Some(mut geo) = self.model.geometry(cell).cloned() else {
                continue;
            };
            match align {
                Align::Left => geo.x = param,
                Align::Center => geo.x = param - geo.width / 2.0,
                Align::Right => geo.x = param - geo.width,
                Align::Top => geo.y = param,
                Align::Middle => geo.y = param - geo.height / 2.0,
                Align::Bottom => geo.y = param - geo.height,
            }
            self.model.set_geometry(cell, Some(geo));
        }
        self.fire(GraphEvent::CellsAligned {
            cells: cells.clone(),
            align,
        });
        self.end_update();
        cells
    }

    // --- auto-sizing ---

    pub fn auto_size_cell(&mut self, cell: CellId, recurse: bool) {
        if recurse {
            for child in self.model.children(cell).to_vec() {
                self.auto_size_cell(child, true);
            }
        }
        if self.model.is_vertex(cell) && self.is_auto_size_cell(cell) {
            self.cell_size_updated(cell, false);
        }
    }

    /// Resizes the cell to its preferred size and fires one notification. Unless
    /// `ignore_children`, the cell never shrinks below the extent of its children.
    pub fn update_cell_size(&mut self, cell: CellId, ignore_children: bool) -> CellId {
        self.begin_update();
        self.cell_size_updated(cell, ignore_children);
        self.fire(GraphEvent::CellSizeUpdated { cell });
        self.end_update();
        cell
    }

    fn cell_size_updated(&mut self, cell: CellId, ignore_children: bool) {
        let Some((width, height)) = self.preferred_size_for_cell(cell) else {
            return;
        };
        let Some(mut geo) = self.model.geometry(cell).cloned() else {
            return;
        };
        if self.is_swimlane(cell) {
            // Keep the header row/column; only the main axis follows the label.
            if style::get_bool(&self.current_cell_style(cell), keys::HORIZONTAL, true) {
                geo.width = geo.width.max(width);
            } else {
                geo.height = geo.height.max(height);
            }
        } else {
            geo.width = width;
            geo.height = height;
        }
        if !ignore_children && !self.model.is_collapsed(cell) {
            let children = self.model.children(cell).to_vec();
            if let Some(bounds) = self.bounding_box_from_geometry(&children, true) {
                geo.width = geo.width.max(bounds.x + bounds.width);
                geo.height = geo.height.max(bounds.y + bounds.height);
            }
        }
        self.model.set_geometry(cell, Some(geo));
        self.constrain_child(cell);
    }

    /// Headless label-size estimate: text measurement belongs to the renderer, so the
    /// preferred size is a fixed-width estimate of the label plus padding.
    pub fn preferred_size_for_cell(&self, cell: CellId) -> Option<(f64, f64)> {
        if self.model.is_edge(cell) {
            return None;
        }
        let label = match self.model.value(cell) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        if label.is_empty() {
            let side = 4.0 * DEFAULT_GRID_SIZE;
            return Some((side, side));
        }
        let width = 8.0 * label.chars().count() as f64 + 16.0;
        let mut height = 30.0;
        if self.is_swimlane(cell) {
            let (sw, sh) = self.start_size(cell);
            height += sh;
            return Some(((width + sw).max(width), height));
        }
        Some((width, height))
    }

    // --- styles ---

    pub fn set_cell_style(&mut self, cell_style: Style, cells: Option<Vec<CellId>>) -> Vec<CellId> {
        let cells = cells.unwrap_or_else(|| self.selection.clone());
        self.begin_update();
        for &cell in &cells {
            self.model.set_style(cell, cell_style.clone());
        }
        self.fire(GraphEvent::StyleChanged {
            cells: cells.clone(),
        });
        self.end_update();
        cells
    }

    /// Sets (or with `None`, removes) one style key on the cells.
    pub fn set_cell_styles(
        &mut self,
        key: &str,
        value: Option<&str>,
        cells: Option<Vec<CellId>>,
    ) -> Vec<CellId> {
        let cells = cells.unwrap_or_else(|| self.selection.clone());
        self.begin_update();
        for &cell in &cells {
            let mut cell_style = self.model.style(cell).clone();
            match value {
                Some(value) => {
                    cell_style.insert(key.to_string(), value.to_string());
                }
                None => {
                    cell_style.shift_remove(key);
                }
            }
            self.model.set_style(cell, cell_style);
        }
        self.fire(GraphEvent::StyleChanged {
            cells: cells.clone(),
        });
        self.end_update();
        cells
    }
}
