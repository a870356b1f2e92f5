//! Arena Shooter - frame-stepped combat simulation for a 2D arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, combat, spawning)
//! - `driver`: Round lifecycle, pause/resume and frame scheduling
//! - `scoreboard`: Default score/session collaborator
//! - `settings`: Data-driven configuration

pub mod driver;
pub mod error;
pub mod scoreboard;
pub mod settings;
pub mod sim;

pub use driver::{Driver, FrameStatus, InputSource, ManualScheduler, Scheduler, ScriptedInput};
pub use error::{InitError, SettingsError};
pub use scoreboard::ScoreBoard;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Frames simulated per second of play
    pub const FRAMES_PER_SECOND: u32 = 60;

    /// Arena width is divided by this to get the base move speed (px/frame)
    pub const MOVE_SPEED_DIVISOR: f32 = 300.0;
    /// Projectiles travel this much faster than the base move speed
    pub const PROJECTILE_VELOCITY_SCALE: f32 = 1.25;

    /// Enemy spawn zone, as fractions of arena width/height
    pub const SPAWN_ZONE_X: (f32, f32) = (0.60, 0.95);
    pub const SPAWN_ZONE_Y: (f32, f32) = (0.10, 0.90);

    /// Extra placement attempts after the first one collides
    pub const SPAWN_PLACEMENT_RETRIES: u32 = 5;
    /// Frames before the first enemy of a round
    pub const INITIAL_SPAWN_DELAY_FRAMES: u32 = 60;
    /// Seconds between two enemy spawns
    pub const SECONDS_BETWEEN_SPAWNS: u32 = 5;
    /// Cap on living enemies in the arena
    pub const MAX_SIMULTANEOUS_ENEMIES: usize = 10;

    /// Aimed shots cool down this much longer than direct shots
    pub const AIMED_COOLDOWN_MULTIPLIER: f32 = 1.5;
    /// Damage used when a projectile is created with a non-positive payload
    pub const DEFAULT_PROJECTILE_DAMAGE: i32 = 10;
}

/// Convert a rate of fire (shots per minute) into a frame cooldown
#[inline]
pub fn cooldown_frames(rate_of_fire: u32, frames_per_second: u32) -> u32 {
    let frames_per_minute = frames_per_second as f32 * 60.0;
    (frames_per_minute / rate_of_fire.max(1) as f32).round() as u32
}

/// Size in pixels of an entity whose size is given in percent of arena width
#[inline]
pub fn ratio_to_pixels(arena_width: f32, ratio: f32) -> f32 {
    arena_width * ratio / 100.0
}
