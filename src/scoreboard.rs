//! Score board: the default session collaborator
//!
//! Tracks score, defeated enemies and a survival clock. The clock counts
//! simulated frames, so a paused round does not age.

use serde::{Deserialize, Serialize};

use crate::consts::FRAMES_PER_SECOND;
use crate::sim::hooks::Session;

/// Score and survival clock for one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    score: u64,
    defeated_enemies: u32,
    frames_survived: u64,
    clock_running: bool,
    frames_per_second: u32,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new(FRAMES_PER_SECOND)
    }
}

impl ScoreBoard {
    pub fn new(frames_per_second: u32) -> Self {
        Self {
            score: 0,
            defeated_enemies: 0,
            frames_survived: 0,
            clock_running: false,
            frames_per_second: frames_per_second.max(1),
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn defeated_enemies(&self) -> u32 {
        self.defeated_enemies
    }

    pub fn is_clock_running(&self) -> bool {
        self.clock_running
    }

    /// Whole seconds survived
    pub fn survived_seconds(&self) -> u64 {
        self.frames_survived / self.frames_per_second as u64
    }

    /// Survival time as `MM:SS` (minutes grow past two digits if needed)
    pub fn survived_time_string(&self) -> String {
        let seconds = self.survived_seconds();
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }

    /// One-line round summary for the game-over dialog
    pub fn summary(&self) -> String {
        format!(
            "You survived for {} and defeated {} enemies reaching a total score of {} points.",
            self.survived_time_string(),
            self.defeated_enemies,
            self.score
        )
    }
}

impl Session for ScoreBoard {
    fn increment_defeated_enemy_counter(&mut self) {
        self.defeated_enemies += 1;
    }

    fn increase_score(&mut self, points: u32) {
        self.score += u64::from(points);
    }

    fn start_clock(&mut self) {
        self.clock_running = true;
    }

    fn stop_clock(&mut self) {
        self.clock_running = false;
    }

    fn reset_score(&mut self) {
        self.score = 0;
        self.defeated_enemies = 0;
        self.frames_survived = 0;
    }

    fn frame_elapsed(&mut self) {
        if self.clock_running {
            self.frames_survived += 1;
        }
    }
}
