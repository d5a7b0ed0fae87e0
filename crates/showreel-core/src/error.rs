//! Error types for the playback binding

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for fallible operations
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal, user-facing playback error
///
/// Set at most once per session. Once set, the video surface is replaced
/// by an error panel carrying the fixed message and the session stays torn
/// down until the next source change.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackError {
    /// Unrecoverable engine fault; the instance has been released
    #[error("Unable to load video. Please try again later.")]
    FatalEngine,

    /// Neither native playback nor a software engine is available
    #[error("HLS is not supported in this browser")]
    Unsupported,
}

impl PlaybackError {
    /// Stable code for diagnostics records
    pub fn error_code(&self) -> &'static str {
        match self {
            PlaybackError::FatalEngine => "FATAL_ENGINE",
            PlaybackError::Unsupported => "UNSUPPORTED",
        }
    }

    /// The fixed message shown in the error panel
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Errors from fallible library operations
///
/// Playback faults never travel this path; they resolve in place to a
/// [`PlaybackError`] panel. This enum covers input validation and tooling.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid source URI: {0}")]
    InvalidSource(#[from] url::ParseError),

    #[error("invalid binding state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}
