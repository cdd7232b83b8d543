//! Point and selection-box helpers used for hit testing and box selection.

use crate::model::Dot;
use serde::{Deserialize, Serialize};

/// A position in display (canvas) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        distance_between_points(self.x, self.y, other.x, other.y)
    }
}

/// Axis-aligned rectangle; width and height may be negative while a drag is
/// in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-sized box anchored at a point
    pub fn anchored_at(point: Point) -> Self {
        Self::new(point.x, point.y, 0.0, 0.0)
    }

    /// Stretch the box so its far corner lies at `point`
    pub fn stretched_to(&self, point: Point) -> Self {
        Self::new(self.x, self.y, point.x - self.x, point.y - self.y)
    }

    pub fn normalized(&self) -> Self {
        normalize_selection_box(self)
    }
}

pub fn distance_between_points(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = ax - bx;
    let dy = ay - by;
    (dx * dx + dy * dy).sqrt()
}

/// Strictly closer than `threshold` pixels
pub fn is_point_near_dot(point: Point, dot: &Dot, threshold: f64) -> bool {
    distance_between_points(point.x, point.y, dot.x, dot.y) < threshold
}

/// Min corner plus absolute extents
pub fn normalize_selection_box(b: &SelectionBox) -> SelectionBox {
    SelectionBox {
        x: b.x.min(b.x + b.width),
        y: b.y.min(b.y + b.height),
        width: b.width.abs(),
        height: b.height.abs(),
    }
}

/// Inclusive on both ends. Expects a normalized box.
pub fn is_dot_inside_box(dot: &Dot, b: &SelectionBox) -> bool {
    dot.x >= b.x && dot.x <= b.x + b.width && dot.y >= b.y && dot.y <= b.y + b.height
}
