//! Actors: bodies with health, a fire cooldown and their own live projectiles

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::ArenaMetrics;
use super::body::Body;
use super::collision::Bounds;
use super::hooks::Presenter;
use super::ids::{EntityRef, IdAllocator, ProjectileId};
use super::projectile::{Owner, Projectile, aimed_velocity, direct_velocity};
use crate::cooldown_frames;

/// Horizontal direction an actor faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// How an actor picks its shot direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireBehavior {
    /// Straight along the facing direction
    Direct,
    /// Toward the target's current position
    Aimed,
}

/// Static tuning record for one kind of actor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorProfile {
    pub max_health: i32,
    pub attack_damage: i32,
    /// Shots per minute
    pub rate_of_fire: u32,
    pub shot_velocity_factor: f32,
    pub speed_factor: f32,
    /// Size in percent of arena width
    pub size_ratio: Vec2,
    /// Projectile size in percent of arena width
    pub projectile_size_ratio: Vec2,
    pub point_value: u32,
    pub fire_behavior: FireBehavior,
}

pub const PLAYER_PROFILE: ActorProfile = ActorProfile {
    max_health: 100,
    attack_damage: 30,
    rate_of_fire: 240,
    shot_velocity_factor: 2.0,
    speed_factor: 1.0,
    size_ratio: Vec2::new(4.0, 4.0),
    projectile_size_ratio: Vec2::new(2.0, 1.0),
    point_value: 0,
    fire_behavior: FireBehavior::Direct,
};

/// Fire readiness state machine: `Ready -> CoolingDown -> Ready`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireState {
    Ready,
    CoolingDown { frames_left: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireControl {
    state: FireState,
    /// Cooldown after a direct shot
    cooldown_frames: u32,
}

impl FireControl {
    pub fn new(cooldown_frames: u32) -> Self {
        Self {
            state: FireState::Ready,
            cooldown_frames,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state == FireState::Ready
    }

    /// Enter cooldown after a shot; `multiplier` lengthens aimed shots
    pub fn begin_cooldown(&mut self, multiplier: f32) {
        let frames = (self.cooldown_frames as f32 * multiplier).ceil() as u32;
        self.state = if frames == 0 {
            FireState::Ready
        } else {
            FireState::CoolingDown {
                frames_left: frames,
            }
        };
    }

    /// Count down one frame
    pub fn reload(&mut self) {
        if let FireState::CoolingDown { frames_left } = self.state {
            self.state = match frames_left.saturating_sub(1) {
                0 => FireState::Ready,
                left => FireState::CoolingDown { frames_left: left },
            };
        }
    }

    pub fn make_ready(&mut self) {
        self.state = FireState::Ready;
    }
}

/// Where a shot goes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aim {
    Direct,
    At(Vec2),
}

/// Per-frame values a shot needs from the arena and settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotContext {
    pub projectile_velocity_base: f32,
    pub aimed_cooldown_multiplier: f32,
}

/// Player movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
    Left,
    Right,
}

/// A player or enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub body: Body,
    /// Step size per move (x) and (y)
    pub move_speed: Vec2,
    pub max_health: i32,
    health: i32,
    pub attack_damage: i32,
    pub shot_velocity_factor: f32,
    pub projectile_size: Vec2,
    pub facing: Facing,
    pub visible: bool,
    pub fire: FireControl,
    shots: BTreeMap<ProjectileId, Projectile>,
    expired_shots: BTreeSet<ProjectileId>,
}

impl Actor {
    /// Build an actor from its profile, sized for the given arena
    pub fn from_profile(profile: &ActorProfile, metrics: &ArenaMetrics, frames_per_second: u32) -> Self {
        let mut actor = Self {
            body: Body::new(Vec2::ZERO, profile.speed_factor),
            move_speed: Vec2::ZERO,
            max_health: profile.max_health,
            health: profile.max_health,
            attack_damage: profile.attack_damage,
            shot_velocity_factor: profile.shot_velocity_factor,
            projectile_size: Vec2::ZERO,
            facing: Facing::default(),
            visible: false,
            fire: FireControl::new(cooldown_frames(profile.rate_of_fire, frames_per_second)),
            shots: BTreeMap::new(),
            expired_shots: BTreeSet::new(),
        };
        actor.apply_metrics(profile, metrics);
        actor
    }

    /// Recompute sizes and speeds from arena metrics (init and resize)
    pub fn apply_metrics(&mut self, profile: &ActorProfile, metrics: &ArenaMetrics) {
        self.body.set_size(metrics.size_from_ratio(profile.size_ratio));
        self.projectile_size = metrics.size_from_ratio(profile.projectile_size_ratio);
        self.move_speed = Vec2::new(metrics.move_speed_base, metrics.move_speed_base / 2.0);
    }

    #[inline]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage; returns true when this hit was lethal
    pub fn take_hit(&mut self, damage: i32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - damage.max(0)).max(0);
        !self.is_alive()
    }

    pub fn restore_health(&mut self) {
        self.health = self.max_health;
    }

    /// Count the fire cooldown down by one frame
    #[inline]
    pub fn reload_next_shot(&mut self) {
        self.fire.reload();
    }

    /// Turn toward a horizontal position
    pub fn face_toward(&mut self, x: f32) {
        self.facing = if x < self.body.position().x {
            Facing::Left
        } else {
            Facing::Right
        };
    }

    /// Fire if ready and alive. Returns the new projectile id, or `None` for
    /// a no-op (cooling down or dead).
    pub fn fire(
        &mut self,
        owner: Owner,
        aim: Aim,
        ctx: &ShotContext,
        ids: &mut IdAllocator,
    ) -> Option<ProjectileId> {
        if !self.is_alive() || !self.fire.is_ready() {
            return None;
        }

        let speed = ctx.projectile_velocity_base * self.shot_velocity_factor;
        let mut shot = Projectile::new(owner, self.attack_damage, Vec2::ZERO, self.projectile_size);
        shot.place_at_origin(&self.body, self.facing);

        let (velocity, cooldown_multiplier) = match aim {
            Aim::Direct => (direct_velocity(self.facing, speed), 1.0),
            Aim::At(target) => (
                aimed_velocity(shot.body.position(), target, speed)
                    .unwrap_or_else(|| direct_velocity(self.facing, speed)),
                ctx.aimed_cooldown_multiplier,
            ),
        };
        shot.body.velocity = velocity;

        let id = ids.next_projectile();
        self.shots.insert(id, shot);
        self.fire.begin_cooldown(cooldown_multiplier);
        Some(id)
    }

    /// Move one step, clamped so the body stays inside `limits`
    pub fn step(&mut self, step: Step, limits: &Bounds) {
        let half = self.body.half_size();
        let mut pos = self.body.position();
        match step {
            Step::Up => pos.y = (pos.y - self.move_speed.y).max(limits.top + half.y),
            Step::Down => pos.y = (pos.y + self.move_speed.y).min(limits.bottom - half.y),
            Step::Left => {
                pos.x = (pos.x - self.move_speed.x).max(limits.left + half.x);
                self.facing = Facing::Left;
            }
            Step::Right => {
                pos.x = (pos.x + self.move_speed.x).min(limits.right - half.x);
                self.facing = Facing::Right;
            }
        }
        self.body.set_position(pos);
    }

    pub fn shots(&self) -> &BTreeMap<ProjectileId, Projectile> {
        &self.shots
    }

    pub fn expired_shots(&self) -> &BTreeSet<ProjectileId> {
        &self.expired_shots
    }

    /// Live projectile map and pending-removal set, borrowed together
    pub fn shots_mut(&mut self) -> (&mut BTreeMap<ProjectileId, Projectile>, &mut BTreeSet<ProjectileId>) {
        (&mut self.shots, &mut self.expired_shots)
    }

    /// True while any projectile (resolved or not) is still registered
    #[inline]
    pub fn has_live_shots(&self) -> bool {
        !self.shots.is_empty()
    }

    /// Queue one of this actor's projectiles for despawn
    pub fn queue_shot_despawn(&mut self, id: ProjectileId, presenter: &mut dyn Presenter) {
        if let Some(shot) = self.shots.get_mut(&id) {
            queue_shot_despawn(&mut self.expired_shots, id, shot, presenter);
        }
    }

    /// Drop every projectile queued for despawn from the live map
    pub fn despawn_expired_shots(&mut self) {
        for id in std::mem::take(&mut self.expired_shots) {
            self.shots.remove(&id);
        }
    }

    /// Remove every projectile at once, resolved or not (round reset, fault recovery)
    pub fn clear_shots(&mut self, presenter: &mut dyn Presenter) {
        for (id, shot) in std::mem::take(&mut self.shots) {
            if shot.active {
                presenter.detach(EntityRef::Projectile(id));
            }
        }
        self.expired_shots.clear();
    }
}

/// Hide a projectile and register it for removal at the owner's next cleanup.
///
/// Free function so it can run while the owner's map is being iterated.
pub fn queue_shot_despawn(
    expired: &mut BTreeSet<ProjectileId>,
    id: ProjectileId,
    shot: &mut Projectile,
    presenter: &mut dyn Presenter,
) {
    if shot.active {
        shot.active = false;
        presenter.detach(EntityRef::Projectile(id));
    }
    expired.insert(id);
}
