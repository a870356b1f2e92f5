//! Enemy kinds and their behaviour table

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorProfile, Aim, FireBehavior, ShotContext};
use super::arena::ArenaMetrics;
use super::ids::{EnemyId, IdAllocator, ProjectileId};
use super::projectile::Owner;

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Default melee type: walks toward the player, fires straight
    Charger,
    /// Ranged type: stationary, aims at the player
    Sharpshooter,
    /// Heavy type: slow, tough, big shots
    Tank,
}

const CHARGER_PROFILE: ActorProfile = ActorProfile {
    max_health: 100,
    attack_damage: 20,
    rate_of_fire: 20,
    shot_velocity_factor: 1.2,
    speed_factor: 0.1,
    size_ratio: Vec2::new(4.0, 4.0),
    projectile_size_ratio: Vec2::new(1.5, 1.5),
    point_value: 50,
    fire_behavior: FireBehavior::Direct,
};

const SHARPSHOOTER_PROFILE: ActorProfile = ActorProfile {
    max_health: 50,
    attack_damage: 30,
    rate_of_fire: 60,
    shot_velocity_factor: 1.5,
    speed_factor: 0.0,
    size_ratio: Vec2::new(4.0, 2.5),
    projectile_size_ratio: Vec2::new(2.0, 1.0),
    point_value: 100,
    fire_behavior: FireBehavior::Aimed,
};

const TANK_PROFILE: ActorProfile = ActorProfile {
    max_health: 300,
    attack_damage: 40,
    rate_of_fire: 15,
    shot_velocity_factor: 0.6,
    speed_factor: 0.1,
    size_ratio: Vec2::new(10.0, 8.0),
    projectile_size_ratio: Vec2::new(3.0, 3.0),
    point_value: 200,
    fire_behavior: FireBehavior::Direct,
};

impl EnemyKind {
    pub fn profile(self) -> &'static ActorProfile {
        match self {
            EnemyKind::Charger => &CHARGER_PROFILE,
            EnemyKind::Sharpshooter => &SHARPSHOOTER_PROFILE,
            EnemyKind::Tank => &TANK_PROFILE,
        }
    }

    /// Kind for the `spawn_count`-th spawn of a round (0-based)
    pub fn for_spawn(spawn_count: u32) -> Self {
        if spawn_count != 0 && spawn_count % 5 == 0 {
            EnemyKind::Tank
        } else if spawn_count != 0 && spawn_count % 3 == 0 {
            EnemyKind::Sharpshooter
        } else {
            EnemyKind::Charger
        }
    }
}

/// An enemy in the arena registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub actor: Actor,
}

impl Enemy {
    pub fn new(kind: EnemyKind, metrics: &ArenaMetrics, frames_per_second: u32) -> Self {
        Self {
            kind,
            actor: Actor::from_profile(kind.profile(), metrics, frames_per_second),
        }
    }

    #[inline]
    pub fn point_value(&self) -> u32 {
        self.kind.profile().point_value
    }

    /// Face the player and walk toward the faced side
    pub fn face_player(&mut self, player: Vec2) {
        self.actor.face_toward(player.x);
        self.actor.body.velocity = Vec2::new(self.actor.facing.sign() * self.actor.move_speed.x, 0.0);
    }

    /// Fire using this kind's behaviour
    pub fn fire(
        &mut self,
        id: EnemyId,
        player: Vec2,
        ctx: &ShotContext,
        ids: &mut IdAllocator,
    ) -> Option<ProjectileId> {
        let aim = match self.kind.profile().fire_behavior {
            FireBehavior::Direct => Aim::Direct,
            FireBehavior::Aimed => Aim::At(player),
        };
        self.actor.fire(Owner::Enemy(id), aim, ctx, ids)
    }

    pub fn apply_metrics(&mut self, metrics: &ArenaMetrics) {
        self.actor.apply_metrics(self.kind.profile(), metrics);
    }
}
