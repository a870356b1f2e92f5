//! Game state: the player, the arena registry and round bookkeeping
//!
//! Everything a frame reads or writes lives here, so two states built from
//! the same settings and fed the same actions stay identical.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, Facing, PLAYER_PROFILE, ShotContext};
use super::arena::{Arena, ArenaMetrics};
use super::hooks::Presenter;
use super::ids::{EnemyId, EntityRef};
use crate::error::InitError;
use crate::settings::Settings;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No round started yet
    Standby,
    /// Frames are being simulated
    Playing,
    /// Round suspended; no frame runs until resumed
    Paused,
    /// Round ended
    GameOver,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Player health reached zero
    PlayerDefeated,
    /// An enemy walked out of the arena
    EnemyBreached(EnemyId),
}

/// Complete simulation state (deterministic, serializable for snapshots)
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub settings: Settings,
    pub arena: Arena,
    pub player: Actor,
    pub phase: GamePhase,
    /// Frames left before the next spawn attempt
    pub frames_until_next_spawn: u32,
    /// Spawn attempts made this round; picks the next enemy kind
    pub spawn_count: u32,
    /// Frames simulated this round
    pub frame: u64,
    /// Spawn placement RNG, reseeded every round
    #[serde(skip)]
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// State for an arena of the configured size
    pub fn new(settings: Settings) -> Result<Self, InitError> {
        let (width, height) = (settings.arena_width, settings.arena_height);
        Self::with_arena(settings, width, height)
    }

    /// State for an arena of the given size
    pub fn with_arena(settings: Settings, width: f32, height: f32) -> Result<Self, InitError> {
        let metrics = ArenaMetrics::new(width, height)?;
        let player = Actor::from_profile(&PLAYER_PROFILE, &metrics, settings.frames_per_second);
        let rng = Pcg32::seed_from_u64(settings.seed);
        Ok(Self {
            frames_until_next_spawn: settings.initial_spawn_delay_frames,
            settings,
            arena: Arena::new(metrics),
            player,
            phase: GamePhase::Standby,
            spawn_count: 0,
            frame: 0,
            rng,
        })
    }

    #[inline]
    pub fn metrics(&self) -> &ArenaMetrics {
        self.arena.metrics()
    }

    /// Values every shot of this frame is built from
    pub fn shot_context(&self) -> ShotContext {
        ShotContext {
            projectile_velocity_base: self.metrics().projectile_velocity_base,
            aimed_cooldown_multiplier: self.settings.aimed_cooldown_multiplier,
        }
    }

    /// Put everything back to the start of a round and begin playing
    pub fn reset_round(&mut self, presenter: &mut dyn Presenter) {
        self.arena.reset(presenter);

        let metrics = *self.arena.metrics();
        let player = &mut self.player;
        player.clear_shots(presenter);
        player.restore_health();
        player.fire.make_ready();
        player.facing = Facing::Right;
        player.body.velocity = Vec2::ZERO;
        // Flush with the left wall, vertically centred
        let start_x = player.body.half_size().x;
        player.body.set_position(Vec2::new(start_x, metrics.height / 2.0));
        player.visible = true;
        presenter.sync_position(EntityRef::Player, player.body.bounds());
        presenter.sync_health(EntityRef::Player, player.health(), player.max_health);
        presenter.set_visible(EntityRef::Player, true);

        self.frames_until_next_spawn = self.settings.initial_spawn_delay_frames;
        self.spawn_count = 0;
        self.frame = 0;
        self.rng = Pcg32::seed_from_u64(self.settings.seed);
        self.phase = GamePhase::Playing;
        log::info!(
            "Round reset: arena {}x{}, seed {:#x}",
            metrics.width,
            metrics.height,
            self.settings.seed
        );
    }

    /// Re-derive arena metrics and rescale every actor
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), InitError> {
        self.arena.resize(width, height)?;
        let metrics = *self.arena.metrics();
        self.player.apply_metrics(&PLAYER_PROFILE, &metrics);
        Ok(())
    }

    /// Apply every pending removal now, even if shots are still queued
    pub fn flush_pending_despawns(&mut self, presenter: &mut dyn Presenter) {
        self.player.despawn_expired_shots();
        self.arena.flush_despawns(presenter);
    }
}
