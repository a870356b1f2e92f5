//! Game settings
//!
//! Loaded from a JSON file next to the binary; every field falls back to the
//! stock tuning when absent.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    /// Arena width used by the headless runner (hosts query their own)
    pub arena_width: f32,
    /// Arena height used by the headless runner
    pub arena_height: f32,

    // === Determinism ===
    /// Seed for spawn placement
    pub seed: u64,
    /// Frames per second of play (cooldowns and clocks count frames)
    pub frames_per_second: u32,

    // === Spawning ===
    /// Cap on living enemies
    pub max_simultaneous_enemies: usize,
    /// Delay between spawns
    pub seconds_between_spawns: u32,
    /// Delay before the first spawn of a round
    pub initial_spawn_delay_frames: u32,
    /// Placement retries before a spawn is skipped
    pub spawn_placement_retries: u32,

    // === Combat ===
    /// Cooldown multiplier applied to aimed shots
    pub aimed_cooldown_multiplier: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_width: 1200.0,
            arena_height: 600.0,

            seed: 0x5EED_CAFE,
            frames_per_second: FRAMES_PER_SECOND,

            max_simultaneous_enemies: MAX_SIMULTANEOUS_ENEMIES,
            seconds_between_spawns: SECONDS_BETWEEN_SPAWNS,
            initial_spawn_delay_frames: INITIAL_SPAWN_DELAY_FRAMES,
            spawn_placement_retries: SPAWN_PLACEMENT_RETRIES,

            aimed_cooldown_multiplier: AIMED_COOLDOWN_MULTIPLIER,
        }
    }
}

impl Settings {
    /// Frames between two spawns, capped at `u32::MAX`
    pub fn spawn_interval_frames(&self) -> u32 {
        self.seconds_between_spawns.saturating_mul(self.frames_per_second)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.frames_per_second == 0 {
            return Err(SettingsError::Invalid {
                field: "frames_per_second",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.arena_width > 0.0) || !(self.arena_height > 0.0) {
            return Err(SettingsError::Invalid {
                field: "arena_width/arena_height",
                reason: format!(
                    "must be positive, got {}x{}",
                    self.arena_width, self.arena_height
                ),
            });
        }
        if !(self.aimed_cooldown_multiplier >= 1.0) {
            return Err(SettingsError::Invalid {
                field: "aimed_cooldown_multiplier",
                reason: format!("must be >= 1.0, got {}", self.aimed_cooldown_multiplier),
            });
        }
        if self
            .seconds_between_spawns
            .checked_mul(self.frames_per_second)
            .is_none()
        {
            return Err(SettingsError::Invalid {
                field: "seconds_between_spawns",
                reason: format!(
                    "{} s at {} fps overflows the frame counter",
                    self.seconds_between_spawns, self.frames_per_second
                ),
            });
        }
        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.spawn_interval_frames(), 300);
        assert_eq!(settings.spawn_placement_retries, 5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "seed": 7, "max_simultaneous_enemies": 3 }"#).unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.max_simultaneous_enemies, 3);
        assert_eq!(settings.frames_per_second, 60);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let settings = Settings {
            frames_per_second: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { field: "frames_per_second", .. })
        ));

        let settings = Settings {
            arena_width: -5.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            aimed_cooldown_multiplier: 0.5,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_spawn_interval_does_not_overflow() {
        let settings = Settings {
            seconds_between_spawns: 100_000_000,
            ..Default::default()
        };
        assert_eq!(settings.spawn_interval_frames(), u32::MAX);
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { field: "seconds_between_spawns", .. })
        ));

        let settings = Settings {
            seconds_between_spawns: u32::MAX / 60,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(settings.spawn_interval_frames(), (u32::MAX / 60) * 60);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("arena_shooter_settings_{}.json", std::process::id()));
        let settings = Settings {
            seed: 99,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let path = std::env::temp_dir().join("arena_shooter_definitely_missing.json");
        assert!(matches!(Settings::load(&path), Err(SettingsError::Io(_))));
        assert_eq!(Settings::load_or_default(Some(&path)), Settings::default());
    }
}
