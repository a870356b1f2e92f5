//! Projectiles and shot velocity maths

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::Facing;
use super::body::Body;
use super::ids::EnemyId;
use crate::consts::DEFAULT_PROJECTILE_DAMAGE;

/// Who fired a projectile. Non-owning: the owner is looked up by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy(EnemyId),
}

/// A projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: Owner,
    pub damage: i32,
    pub body: Body,
    /// False once queued for despawn: invisible and no longer hits anything
    pub active: bool,
}

impl Projectile {
    pub fn new(owner: Owner, damage: i32, velocity: Vec2, size: Vec2) -> Self {
        let mut body = Body::new(size, 1.0);
        body.velocity = velocity;
        Self {
            owner,
            damage: if damage > 0 {
                damage
            } else {
                DEFAULT_PROJECTILE_DAMAGE
            },
            body,
            active: true,
        }
    }

    /// Place the projectile just outside the shooter's facing edge
    pub fn place_at_origin(&mut self, shooter: &Body, facing: Facing) {
        let half_width = self.body.half_size().x;
        let bounds = shooter.bounds();
        let origin_x = match facing {
            Facing::Right => bounds.right + half_width,
            Facing::Left => bounds.left - half_width,
        };
        self.body
            .set_position(Vec2::new(origin_x, shooter.position().y));
    }

    #[inline]
    pub fn advance(&mut self) {
        self.body.advance();
    }
}

/// Straight shot along the facing direction
pub fn direct_velocity(facing: Facing, speed: f32) -> Vec2 {
    Vec2::new(facing.sign() * speed, 0.0)
}

/// Shot from `origin` toward `target` at constant `speed` whatever the angle.
///
/// `None` when the target sits exactly on the origin.
pub fn aimed_velocity(origin: Vec2, target: Vec2, speed: f32) -> Option<Vec2> {
    let delta = target - origin;
    let distance = delta.length();
    if distance <= f32::EPSILON {
        return None;
    }
    Some(delta / distance * speed)
}
