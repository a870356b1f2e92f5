//! Axis-aligned bounding boxes and the overlap test
//!
//! One predicate serves projectile hits, spawn placement rejection and
//! out-of-bounds detection. Intervals are open: boxes that only share an edge
//! do not overlap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Edges of an axis-aligned box (screen coordinates, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Bounds {
    /// Box of `size` centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            top: center.y - half.y,
            right: center.x + half.x,
            bottom: center.y + half.y,
            left: center.x - half.x,
        }
    }

    /// Box spanning `[0, width] x [0, height]`
    pub fn from_extent(width: f32, height: f32) -> Self {
        Self {
            top: 0.0,
            right: width,
            bottom: height,
            left: 0.0,
        }
    }

    /// Whether the two boxes share any interior area
    #[inline]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        overlaps(self, other)
    }
}

/// Open-interval overlap on both axes
#[inline]
pub fn overlaps(a: &Bounds, b: &Bounds) -> bool {
    let matching_x = a.right > b.left && a.left < b.right;
    let matching_y = a.bottom > b.top && a.top < b.bottom;
    matching_x && matching_y
}
