//! Stacks children along one axis, with optional wrapping and parent resizing.

use crate::base::{self, Layout};
use marlin_model::cell::CellId;
use marlin_model::geometry::{Geometry, Rect};
use marlin_model::graph::Graph;
use marlin_model::style::{self, keys};

pub struct StackLayout {
    pub horizontal: bool,
    pub spacing: f64,
    pub x0: f64,
    pub y0: f64,
    pub border: f64,
    pub margin_top: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    /// Leaves the first child where it is instead of snapping it to the stack origin.
    pub keep_first_location: bool,
    /// Stretches every child to the parent's cross-axis extent.
    pub fill: bool,
    pub resize_parent: bool,
    /// With `resize_parent`, only ever grows the parent.
    pub resize_parent_max: bool,
    /// Stretches the last child to the end of the parent instead of resizing the parent.
    pub resize_last: bool,
    /// Main-axis extent after which the stack wraps into a new row/column.
    pub wrap: Option<f64>,
    /// Ignore child stroke widths when packing.
    pub border_collapse: bool,
    /// Children already past their slot keep their larger coordinate, leaving a gap.
    pub allow_gaps: bool,
}

impl Default for StackLayout {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StackLayout {
    pub fn new(horizontal: bool) -> Self {
        Self {
            horizontal,
            spacing: 0.0,
            x0: 0.0,
            y0: 0.0,
            border: 0.0,
            margin_top: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            keep_first_location: false,
            fill: false,
            resize_parent: false,
            resize_parent_max: false,
            resize_last: false,
            wrap: None,
            border_collapse: true,
            allow_gaps: false,
        }
    }

    fn set_child_geometry(&self, graph: &mut Graph, child: CellId, geo: Geometry) {
        if graph.model.geometry(child) != Some(&geo) {
            graph.model.set_geometry(child, Some(geo));
        }
    }

    fn update_parent_geometry(&self, graph: &mut Graph, parent: CellId, pgeo: &Rect, last: &Geometry) {
        let Some(mut geo) = graph.model.geometry(parent).cloned() else {
            return;
        };
        if self.horizontal {
            let tmp = last.x + last.width + self.margin_right + self.border;
            geo.width = if self.resize_parent_max {
                geo.width.max(tmp)
            } else {
                tmp
            };
        } else {
            let tmp = last.y + last.height + self.margin_bottom + self.border;
            geo.height = if self.resize_parent_max {
                geo.height.max(tmp)
            } else {
                tmp
            };
        }
        if geo.rect() != *pgeo {
            graph.model.set_geometry(parent, Some(geo));
        }
    }
}

impl Layout for StackLayout {
    fn execute(&mut self, graph: &mut Graph, parent: CellId) {
        let pgeo = graph.model.geometry(parent).map(Geometry::rect);
        let mut fill_value = pgeo.map(|p| {
            let v = if self.horizontal {
                p.height - self.margin_top - self.margin_bottom
            } else {
                p.width - self.margin_left - self.margin_right
            };
            v - 2.0 * self.border
        });
        let mut x0 = self.x0 + self.border + self.margin_left;
        let mut y0 = self.y0 + self.border + self.margin_top;
        if graph.is_swimlane(parent) {
            let parent_style = graph.current_cell_style(parent);
            let start = style::get_f64(&parent_style, keys::STARTSIZE, style::DEFAULT_STARTSIZE);
            let horz = style::get_bool(&parent_style, keys::HORIZONTAL, true);
            if self.horizontal == horz {
                if self.horizontal {
                    y0 += start;
                } else {
                    x0 += start;
                }
                if let Some(fill) = &mut fill_value {
                    *fill -= start;
                }
            }
        }
        graph.begin_update();
        let mut tmp = 0.0f64;
        let mut last: Option<Geometry> = None;
        let mut last_value = 0.0f64;
        let mut last_child: Option<CellId> = None;
        for child in graph.model.children(parent).to_vec() {
            if base::is_vertex_ignored(graph, child) || !base::is_vertex_movable(graph, child) {
                continue;
            }
            let Some(mut geo) = graph.model.geometry(child).cloned() else {
                continue;
            };
            if let (Some(wrap), Some(prev)) = (self.wrap, &last) {
                let overflow = if self.horizontal {
                    prev.x + prev.width + geo.width + 2.0 * self.spacing > wrap
                } else {
                    prev.y + prev.height + geo.height + 2.0 * self.spacing > wrap
                };
                if overflow {
                    last = None;
                    if self.horizontal {
                        y0 += tmp + self.spacing;
                    } else {
                        x0 += tmp + self.spacing;
                    }
                    tmp = 0.0;
                }
            }
            tmp = tmp.max(if self.horizontal { geo.height } else { geo.width });
            let sw = if self.border_collapse {
                0.0
            } else {
                style::get_f64(&graph.current_cell_style(child), keys::STROKEWIDTH, 1.0)
            };
            if last.is_some() {
                let slot = last_value + self.spacing + (sw / 2.0).floor();
                if self.horizontal {
                    geo.x = if self.allow_gaps { slot.max(geo.x) } else { slot };
                } else {
                    geo.y = if self.allow_gaps { slot.max(geo.y) } else { slot };
                }
            } else if !self.keep_first_location {
                if self.horizontal {
                    geo.x = if self.allow_gaps && geo.x > x0 {
                        geo.x.max(x0)
                    } else {
                        x0
                    };
                } else {
                    geo.y = if self.allow_gaps && geo.y > y0 {
                        geo.y.max(y0)
                    } else {
                        y0
                    };
                }
            }
            if self.horizontal {
                geo.y = y0;
            } else {
                geo.x = x0;
            }
            if self.fill {
                if let Some(fill) = fill_value {
                    if self.horizontal {
                        geo.height = fill;
                    } else {
                        geo.width = fill;
                    }
                }
            }
            last_value = if self.horizontal {
                geo.x + geo.width + (sw / 2.0).floor()
            } else {
                geo.y + geo.height + (sw / 2.0).floor()
            };
            self.set_child_geometry(graph, child, geo.clone());
            last_child = Some(child);
            last = Some(geo);
        }
        if let (Some(pgeo), Some(last)) = (pgeo, &last) {
            if self.resize_parent && !graph.model.is_collapsed(parent) {
                self.update_parent_geometry(graph, parent, &pgeo, last);
            } else if self.resize_last {
                if let Some(last_child) = last_child {
                    let mut geo = last.clone();
                    if self.horizontal {
                        geo.width =
                            pgeo.width - geo.x - self.spacing - self.margin_right - self.margin_left;
                    } else {
                        geo.height = pgeo.height - geo.y - self.spacing - self.margin_bottom;
                    }
                    self.set_child_geometry(graph, last_child, geo);
                }
            }
        }
        graph.end_update();
    }
}
