//! Error types for round start-up and configuration

use thiserror::Error;

/// A required collaborator was missing or unusable when a round was started.
///
/// Fatal to starting that round; never retried automatically.
#[derive(Debug, Error, PartialEq)]
pub enum InitError {
    #[error("no arena attached: query the arena size before starting a round")]
    MissingArena,
    #[error("no input source attached")]
    MissingInput,
    #[error("invalid arena size {width}x{height}")]
    InvalidArena { width: f32, height: f32 },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
