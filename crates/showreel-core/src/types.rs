//! Core types for the playback binding

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Unique identifier for a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public input contract for the player component
///
/// A change to `source` invalidates the current playback session; every
/// other field is purely presentational and survives re-binding untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProps {
    /// Stream manifest URI
    pub source: Url,
    /// Poster image shown before playback starts
    pub poster: Option<Url>,
    /// Start playback without user interaction
    pub autoplay: bool,
    /// Start with audio muted
    pub muted: bool,
    /// Show the surface's native transport controls
    pub show_controls: bool,
    /// Visual sizing/styling class applied to the rendered block
    pub style_class: Option<String>,
}

impl PlayerProps {
    /// Create props for a source URI, defaults elsewhere
    pub fn new(source: &str) -> Result<Self> {
        let source = Url::parse(source).map_err(Error::InvalidSource)?;
        Ok(Self {
            source,
            poster: None,
            autoplay: false,
            muted: false,
            show_controls: true,
            style_class: None,
        })
    }

    pub fn with_poster(mut self, poster: Url) -> Self {
        self.poster = Some(poster);
        self
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    pub fn with_controls(mut self, show_controls: bool) -> Self {
        self.show_controls = show_controls;
        self
    }

    pub fn with_style_class(mut self, class: impl Into<String>) -> Self {
        self.style_class = Some(class.into());
        self
    }
}

/// Fixed tuning applied to every software engine instance
///
/// These values are deliberate: enough forward buffer to ride out bitrate
/// switches without holding minutes of media in memory, and a back buffer
/// short enough that long sessions do not grow unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds of already-played media retained behind the playhead
    pub back_buffer_secs: f64,
    /// Forward buffer target in seconds
    pub max_buffer_secs: f64,
    /// Hard cap on the forward buffer in seconds
    pub max_max_buffer_secs: f64,
    /// Buffer memory cap in bytes
    pub max_buffer_bytes: u64,
    /// Largest buffer gap the engine may jump over, in seconds
    pub max_buffer_hole_secs: f64,
    /// Run demuxing/parsing on a background worker thread
    pub enable_worker: bool,
    /// Low-latency live tuning
    pub low_latency_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            back_buffer_secs: 90.0,
            max_buffer_secs: 30.0,
            max_max_buffer_secs: 600.0,
            max_buffer_bytes: 60_000_000,
            max_buffer_hole_secs: 0.5,
            enable_worker: true,
            low_latency_mode: false,
        }
    }
}

/// Playback strategy selected by the capability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// The surface plays the manifest natively; no engine involved
    Native,
    /// A software streaming engine is bound to the surface
    Engine,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Native => write!(f, "native"),
            Strategy::Engine => write!(f, "engine"),
        }
    }
}

/// Binding state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingState {
    /// No binding established yet
    Uninitialized,
    /// Surface plays the source natively
    NativeBound,
    /// A software engine instance is attached to the surface
    EngineBound,
    /// No playback strategy available in this runtime
    Unsupported,
    /// Terminal fatal fault; session torn down
    Error,
}

impl BindingState {
    /// Check if transition to target state is valid
    ///
    /// `Unsupported` and `Error` are terminal until a source change drops
    /// the binding back to `Uninitialized` and re-probes.
    pub fn can_transition_to(&self, target: BindingState) -> bool {
        use BindingState::*;
        matches!(
            (self, target),
            // Capability probe outcomes
            (Uninitialized, NativeBound)
                | (Uninitialized, EngineBound)
                | (Uninitialized, Unsupported)
                // Source change / unmount
                | (NativeBound, Uninitialized)
                | (EngineBound, Uninitialized)
                | (Unsupported, Uninitialized)
                | (Error, Uninitialized)
                // Terminal fatal fault
                | (EngineBound, Error)
        )
    }
}

impl std::fmt::Display for BindingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingState::Uninitialized => write!(f, "uninitialized"),
            BindingState::NativeBound => write!(f, "native_bound"),
            BindingState::EngineBound => write!(f, "engine_bound"),
            BindingState::Unsupported => write!(f, "unsupported"),
            BindingState::Error => write!(f, "error"),
        }
    }
}
