//! Geometry primitives for cells.
//!
//! These are intentionally lightweight and `Clone`-friendly to support deterministic tests.
//! A `Geometry` doubles as a vertex rectangle and an edge route: vertices use the x/y/width/height
//! fields (optionally relative to the parent box), edges use the waypoint list plus the optional
//! terminal-point overrides for dangling ends.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x
            && pt.x <= self.x + self.width
            && pt.y >= self.y
            && pt.y <= self.y + self.height
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }

    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        Rect {
            x,
            y,
            width: (right - x).max(0.0),
            height: (bottom - y).max(0.0),
        }
    }

    pub fn from_points(points: &[Point]) -> Option<Rect> {
        let first = points.first()?;
        let mut out = Rect::new(first.x, first.y, 0.0, 0.0);
        for pt in &points[1..] {
            out = out.union(&Rect::new(pt.x, pt.y, 0.0, 0.0));
        }
        Some(out)
    }
}

/// Position, size and routing information for a single cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// When set, x and y are fractions of the parent's box and `offset` is the pixel adjustment.
    pub relative: bool,
    pub offset: Option<Point>,
    /// Ordered edge waypoints.
    pub points: Vec<Point>,
    /// Fixed endpoint used while the source terminal is unconnected.
    pub source_point: Option<Point>,
    /// Fixed endpoint used while the target terminal is unconnected.
    pub target_point: Option<Point>,
    /// Stashed bounds swapped in when the cell is collapsed.
    pub alternate_bounds: Option<Rect>,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn terminal_point(&self, is_source: bool) -> Option<Point> {
        if is_source {
            self.source_point
        } else {
            self.target_point
        }
    }

    pub fn set_terminal_point(&mut self, point: Option<Point>, is_source: bool) {
        if is_source {
            self.source_point = point;
        } else {
            self.target_point = point;
        }
    }

    /// Shifts the geometry. Relative positions are left alone; terminal points and waypoints
    /// always move with the cell.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if !self.relative {
            self.x += dx;
            self.y += dy;
        }
        if let Some(pt) = &mut self.source_point {
            pt.x += dx;
            pt.y += dy;
        }
        if let Some(pt) = &mut self.target_point {
            pt.x += dx;
            pt.y += dy;
        }
        for pt in &mut self.points {
            pt.x += dx;
            pt.y += dy;
        }
    }

    /// Scales the geometry. Relative positions keep their fractional x/y. With `fixed_aspect`
    /// the smaller factor is applied to both dimensions.
    pub fn scale(&mut self, sx: f64, sy: f64, fixed_aspect: bool) {
        if let Some(pt) = &mut self.source_point {
            pt.x *= sx;
            pt.y *= sy;
        }
        if let Some(pt) = &mut self.target_point {
            pt.x *= sx;
            pt.y *= sy;
        }
        for pt in &mut self.points {
            pt.x *= sx;
            pt.y *= sy;
        }
        if !self.relative {
            self.x *= sx;
            self.y *= sy;
        }
        let (sx, sy) = if fixed_aspect {
            let s = sx.min(sy);
            (s, s)
        } else {
            (sx, sy)
        };
        self.width *= sx;
        self.height *= sy;
    }

    /// Exchanges the current bounds with `alternate_bounds`. No-op without alternates.
    pub fn swap(&mut self) {
        if let Some(alt) = self.alternate_bounds {
            self.alternate_bounds = Some(self.rect());
            self.x = alt.x;
            self.y = alt.y;
            self.width = alt.width;
            self.height = alt.height;
        }
    }
}
