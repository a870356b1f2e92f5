//! Positioned, sized, moving body shared by every entity

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Bounds;

/// Position, size and motion of an entity.
///
/// The bounding box is cached and refreshed on every position or size
/// change, so `bounds()` is never stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    position: Vec2,
    size: Vec2,
    bounds: Bounds,
    /// Displacement per frame before the speed factor is applied
    pub velocity: Vec2,
    /// Per-type multiplier on `velocity`
    pub speed_factor: f32,
}

impl Body {
    pub fn new(size: Vec2, speed_factor: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            size,
            bounds: Bounds::from_center(Vec2::ZERO, size),
            velocity: Vec2::ZERO,
            speed_factor,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn half_size(&self) -> Vec2 {
        self.size / 2.0
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.refresh_bounds();
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.refresh_bounds();
    }

    /// Move by one frame of scaled velocity
    pub fn advance(&mut self) {
        self.set_position(self.position + self.velocity * self.speed_factor);
    }

    /// Whether the two bodies' boxes overlap
    #[inline]
    pub fn collides_with(&self, other: &Body) -> bool {
        self.bounds.overlaps(&other.bounds)
    }

    fn refresh_bounds(&mut self) {
        self.bounds = Bounds::from_center(self.position, self.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_advance_applies_speed_factor() {
        let mut body = Body::new(Vec2::new(10.0, 10.0), 0.5);
        body.set_position(Vec2::new(100.0, 100.0));
        body.velocity = Vec2::new(-4.0, 2.0);
        body.advance();
        assert_eq!(body.position(), Vec2::new(98.0, 101.0));
        assert_eq!(body.bounds().left, 93.0);
        assert_eq!(body.bounds().top, 96.0);
    }

    #[test]
    fn test_stationary_speed_factor() {
        let mut body = Body::new(Vec2::new(10.0, 10.0), 0.0);
        body.set_position(Vec2::new(5.0, 5.0));
        body.velocity = Vec2::new(-4.0, 0.0);
        body.advance();
        assert_eq!(body.position(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_set_size_refreshes_bounds() {
        let mut body = Body::new(Vec2::new(10.0, 10.0), 1.0);
        body.set_position(Vec2::new(50.0, 50.0));
        body.set_size(Vec2::new(20.0, 4.0));
        assert_eq!(body.bounds().right, 60.0);
        assert_eq!(body.bounds().bottom, 52.0);
    }

    proptest! {
        #[test]
        fn prop_bounds_follow_position(
            x in -2000.0f32..2000.0, y in -2000.0f32..2000.0,
            w in 0.0f32..400.0, h in 0.0f32..400.0,
        ) {
            let mut body = Body::new(Vec2::new(w, h), 1.0);
            body.set_position(Vec2::new(x, y));
            let b = body.bounds();
            prop_assert_eq!(b.top, y - h / 2.0);
            prop_assert_eq!(b.right, x + w / 2.0);
            prop_assert_eq!(b.bottom, y + h / 2.0);
            prop_assert_eq!(b.left, x - w / 2.0);
        }

        #[test]
        fn prop_collision_is_symmetric(
            ax in 0.0f32..300.0, ay in 0.0f32..300.0,
            bx in 0.0f32..300.0, by in 0.0f32..300.0,
            size in 1.0f32..80.0,
        ) {
            let mut a = Body::new(Vec2::splat(size), 1.0);
            let mut b = Body::new(Vec2::new(size / 2.0, size * 1.5), 1.0);
            a.set_position(Vec2::new(ax, ay));
            b.set_position(Vec2::new(bx, by));
            prop_assert_eq!(a.collides_with(&b), b.collides_with(&a));
        }
    }
}
