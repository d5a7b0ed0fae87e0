//! Streaming engine collaborator
//!
//! Abstracts the software adaptive-streaming library the component falls
//! back to when the surface lacks native manifest support. Calls on the
//! engine are infallible; faults arrive asynchronously as [`EngineEvent`]s
//! delivered back through the player on the host's event loop.

use crate::surface::VideoSurface;
use crate::types::EngineConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// Runtime gateway to a software streaming engine
pub trait EngineProvider: Send + Sync {
    /// Whether the engine can run in this runtime
    fn is_supported(&self) -> bool;

    /// Construct a fresh engine instance with the given tuning
    fn create(&self, config: &EngineConfig) -> Box<dyn StreamEngine>;
}

/// One live streaming session bound to one video surface
pub trait StreamEngine: Send {
    /// Begin loading the manifest at `source`
    fn load_source(&mut self, source: &Url);

    /// Bind this engine to a video surface
    fn attach_media(&mut self, surface: Arc<dyn VideoSurface>);

    /// Restart loading of the current source (network-fault recovery)
    fn start_load(&mut self);

    /// Run the engine's built-in media-error recovery routine
    fn recover_media_error(&mut self);

    /// Release the engine and everything it holds
    fn destroy(&mut self);
}

/// Events an engine reports back to the component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Manifest parsed; quality ladder known
    ManifestParsed { levels: usize },
    /// The engine switched quality levels
    LevelSwitched { height: u32 },
    /// A fault occurred
    Fault(EngineFault),
}

/// An engine-reported fault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineFault {
    pub kind: FaultKind,
    /// Non-fatal faults are self-recovered by the engine and ignored here
    pub fatal: bool,
    #[serde(default)]
    pub detail: String,
}

impl EngineFault {
    pub fn fatal(kind: FaultKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            fatal: true,
            detail: detail.into(),
        }
    }

    pub fn transient(kind: FaultKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            fatal: false,
            detail: detail.into(),
        }
    }
}

/// Engine fault classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Manifest or segment fetch failed
    Network,
    /// Demux/decode failed
    Media,
    /// Anything else; treated as terminal when fatal
    Other,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultKind::Network => write!(f, "network"),
            FaultKind::Media => write!(f, "media"),
            FaultKind::Other => write!(f, "other"),
        }
    }
}
