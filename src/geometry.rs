// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Geometry

use serde::{Deserialize, Serialize};

// ─── Points ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point2) -> f64 {
        distance(self.x, self.y, other.x, other.y)
    }

    /// Linear interpolation toward `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(&self, other: Point2, t: f64) -> Point2 {
        Point2::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

// ─── Viewport ────────────────────────────────────────────────────────────────

/// Drawing area size in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point2 {
        Point2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Map fractional coordinates (0..1 on each axis) into the viewport.
    pub fn at_fraction(&self, fx: f64, fy: f64) -> Point2 {
        Point2::new(self.width * fx, self.height * fy)
    }

    pub fn contains(&self, p: Point2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Negative or non-finite sizes collapse to zero.
    pub fn sanitized(self) -> Self {
        let fix = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self::new(fix(self.width), fix(self.height))
    }
}

// ─── Free functions ──────────────────────────────────────────────────────────

/// Euclidean distance between two points.
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}

/// Rotate `p` about the Y axis by `angle` radians.
pub fn rotate_y(p: Vec3, angle: f64) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(p.x * cos - p.z * sin, p.y, p.x * sin + p.z * cos)
}

/// Rotate `p` about the X axis by `angle` radians.
pub fn rotate_x(p: Vec3, angle: f64) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(p.x, p.y * cos - p.z * sin, p.y * sin + p.z * cos)
}

/// Perspective projection onto the screen plane.
///
/// `screen = p.xy * (focal / (focal + p.z)) + center`. Larger `z` is farther
/// from the viewer. Points at or behind the eye (`focal + z <= 0`) are
/// pinned to the center instead of flipping through infinity.
pub fn project(p: Vec3, focal_length: f64, center: Point2) -> Point2 {
    let depth = focal_length + p.z;
    if depth <= f64::EPSILON {
        return center;
    }
    let scale = focal_length / depth;
    Point2::new(p.x * scale + center.x, p.y * scale + center.y)
}

/// Opacity of a proximity line: `1 - d / max`, `None` at or beyond `max`.
///
/// Shared by the particle pair lines and the pointer lines.
pub fn proximity_opacity(distance: f64, max_distance: f64) -> Option<f64> {
    if max_distance <= 0.0 || !(distance < max_distance) {
        return None;
    }
    Some(1.0 - distance / max_distance)
}
