//! Arena registry: dimensions, enemies, spawn placement and deferred despawn

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::collision::Bounds;
use super::enemy::{Enemy, EnemyKind};
use super::hooks::Presenter;
use super::ids::{EnemyId, EntityRef, IdAllocator};
use crate::consts::*;
use crate::error::InitError;
use crate::ratio_to_pixels;

/// Values derived from the arena size, recomputed on init and resize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaMetrics {
    pub width: f32,
    pub height: f32,
    /// Base move speed in px/frame
    pub move_speed_base: f32,
    /// Base projectile speed in px/frame
    pub projectile_velocity_base: f32,
    /// Where enemy centers may be placed
    pub spawn_zone: Bounds,
}

impl ArenaMetrics {
    pub fn new(width: f32, height: f32) -> Result<Self, InitError> {
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(InitError::InvalidArena { width, height });
        }
        let move_speed_base = width / MOVE_SPEED_DIVISOR;
        Ok(Self {
            width,
            height,
            move_speed_base,
            projectile_velocity_base: move_speed_base * PROJECTILE_VELOCITY_SCALE,
            spawn_zone: Bounds {
                top: height * SPAWN_ZONE_Y.0,
                right: width * SPAWN_ZONE_X.1,
                bottom: height * SPAWN_ZONE_Y.1,
                left: width * SPAWN_ZONE_X.0,
            },
        })
    }

    /// The playable rectangle
    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::from_extent(self.width, self.height)
    }

    /// Size from percent-of-width ratios
    pub fn size_from_ratio(&self, ratio: Vec2) -> Vec2 {
        Vec2::new(
            ratio_to_pixels(self.width, ratio.x),
            ratio_to_pixels(self.width, ratio.y),
        )
    }

    /// Box no longer overlaps the arena at all
    #[inline]
    pub fn is_out_of_bounds(&self, body: &Body) -> bool {
        !self.bounds().overlaps(body.bounds())
    }
}

/// Result of one spawn attempt. Neither variant is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Placed(EnemyId),
    /// Every candidate point collided; nothing was registered
    Aborted { retries: u32 },
}

/// Enemy registry and arena bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    metrics: ArenaMetrics,
    /// Ordered by id, which is spawn order
    enemies: BTreeMap<EnemyId, Enemy>,
    /// Dead enemies waiting for their projectiles to resolve
    despawn_queue: BTreeSet<EnemyId>,
    pub ids: IdAllocator,
}

impl Arena {
    pub fn new(metrics: ArenaMetrics) -> Self {
        Self {
            metrics,
            enemies: BTreeMap::new(),
            despawn_queue: BTreeSet::new(),
            ids: IdAllocator::default(),
        }
    }

    #[inline]
    pub fn metrics(&self) -> &ArenaMetrics {
        &self.metrics
    }

    /// Re-derive metrics for a new size and rescale every enemy
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), InitError> {
        self.metrics = ArenaMetrics::new(width, height)?;
        log::info!("Arena resized to {width}x{height}");
        for enemy in self.enemies.values_mut() {
            enemy.apply_metrics(&self.metrics);
        }
        Ok(())
    }

    pub fn enemies(&self) -> &BTreeMap<EnemyId, Enemy> {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut BTreeMap<EnemyId, Enemy> {
        &mut self.enemies
    }

    /// Enemy map and id allocator, borrowed together for firing
    pub fn enemies_and_ids_mut(&mut self) -> (&mut BTreeMap<EnemyId, Enemy>, &mut IdAllocator) {
        (&mut self.enemies, &mut self.ids)
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }

    pub fn despawn_queue(&self) -> &BTreeSet<EnemyId> {
        &self.despawn_queue
    }

    pub fn living_enemy_count(&self) -> usize {
        self.enemies.values().filter(|e| e.actor.is_alive()).count()
    }

    /// Uniform point inside the spawn zone
    pub fn random_spawn_location(&self, rng: &mut impl Rng) -> Vec2 {
        let zone = &self.metrics.spawn_zone;
        Vec2::new(
            sample_axis(rng, zone.left, zone.right),
            sample_axis(rng, zone.top, zone.bottom),
        )
    }

    /// Create an enemy at a random free point of the spawn zone.
    ///
    /// A candidate colliding with the player or a living enemy is redrawn up
    /// to `retries` times; after that the spawn is skipped and nothing is
    /// registered or shown.
    pub fn add_enemy_at_random(
        &mut self,
        kind: EnemyKind,
        player: &Body,
        rng: &mut impl Rng,
        retries: u32,
        frames_per_second: u32,
        presenter: &mut dyn Presenter,
    ) -> SpawnOutcome {
        let mut enemy = Enemy::new(kind, &self.metrics, frames_per_second);

        let mut placed = false;
        for attempt in 0..=retries {
            enemy.actor.body.set_position(self.random_spawn_location(rng));
            if !self.is_blocked(&enemy.actor.body, player) {
                placed = true;
                break;
            }
            log::trace!("{kind:?} placement attempt {attempt} collided");
        }
        if !placed {
            log::debug!("Skipping {kind:?} spawn: no free spot after {retries} retries");
            return SpawnOutcome::Aborted { retries };
        }

        enemy.face_player(player.position());
        enemy.actor.visible = true;

        let id = self.ids.next_enemy();
        presenter.sync_position(EntityRef::Enemy(id), enemy.actor.body.bounds());
        presenter.sync_health(EntityRef::Enemy(id), enemy.actor.health(), enemy.actor.max_health);
        presenter.set_visible(EntityRef::Enemy(id), true);
        self.enemies.insert(id, enemy);
        log::debug!("Spawned {kind:?} as {id}");
        SpawnOutcome::Placed(id)
    }

    /// Dead enemies awaiting despawn are hidden and never block a spawn
    fn is_blocked(&self, candidate: &Body, player: &Body) -> bool {
        candidate.collides_with(player)
            || self
                .enemies
                .values()
                .filter(|e| e.actor.is_alive())
                .any(|e| candidate.collides_with(&e.actor.body))
    }

    /// Insert an already placed enemy (round setup and tests)
    pub fn insert_enemy(&mut self, enemy: Enemy) -> EnemyId {
        let id = self.ids.next_enemy();
        self.enemies.insert(id, enemy);
        id
    }

    /// Hide a dead enemy now; it leaves the registry once its shots resolve
    pub fn queue_enemy_despawn(&mut self, id: EnemyId, presenter: &mut dyn Presenter) {
        if let Some(enemy) = self.enemies.get_mut(&id) {
            if enemy.actor.visible {
                enemy.actor.visible = false;
                presenter.set_visible(EntityRef::Enemy(id), false);
            }
            self.despawn_queue.insert(id);
        }
    }

    /// Remove queued enemies that have no projectile left in flight
    pub fn clear_dead_enemies(&mut self, presenter: &mut dyn Presenter) {
        let enemies = &mut self.enemies;
        self.despawn_queue.retain(|id| {
            let safe = enemies.get(id).is_none_or(|e| !e.actor.has_live_shots());
            if safe && enemies.remove(id).is_some() {
                presenter.detach(EntityRef::Enemy(*id));
            }
            !safe
        });
    }

    /// Drop every pending removal immediately, safe or not (fault recovery)
    pub fn flush_despawns(&mut self, presenter: &mut dyn Presenter) {
        for enemy in self.enemies.values_mut() {
            enemy.actor.despawn_expired_shots();
        }
        for id in std::mem::take(&mut self.despawn_queue) {
            if let Some(mut enemy) = self.enemies.remove(&id) {
                enemy.actor.clear_shots(presenter);
                presenter.detach(EntityRef::Enemy(id));
            }
        }
    }

    /// Remove every enemy and projectile unconditionally and restart ids
    pub fn reset(&mut self, presenter: &mut dyn Presenter) {
        for (id, mut enemy) in std::mem::take(&mut self.enemies) {
            enemy.actor.clear_shots(presenter);
            presenter.detach(EntityRef::Enemy(id));
        }
        self.despawn_queue.clear();
        self.ids.reset();
    }
}

fn sample_axis(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}
