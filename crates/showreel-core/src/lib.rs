//! Showreel Core - Adaptive playback binding library
//!
//! This crate owns the non-presentational half of embedding an adaptive
//! bitrate stream in a host UI:
//! - capability probing (native manifest support vs. software engine)
//! - engine instance lifecycle across mount, source change, and unmount
//! - fault dispatch with in-place recovery for network/media errors
//! - structured diagnostics the host can subscribe to
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                  AdaptiveVideoPlayer                   │
//! │                                                        │
//! │  probe ──► NativeBound ──► surface.set_source()        │
//! │        └─► EngineBound ──► engine slot (at most one)   │
//! │        └─► Unsupported ──► error panel                 │
//! │                                                        │
//! │  engine events ──► informational / recover / terminal  │
//! └───────────┬────────────────────────┬───────────────────┘
//!             │                        │
//!      VideoSurface trait       EngineProvider trait
//!      (host rendering)         (streaming library)
//! ```
//!
//! The component itself performs no network calls and holds no state
//! beyond the current session; everything it owns is released on source
//! change, unmount, or drop.

pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod player;
pub mod sim;
pub mod surface;
pub mod types;

pub use diagnostics::{DiagnosticsEmitter, PlaybackEvent, PlaybackEventRecord};
pub use engine::{EngineEvent, EngineFault, EngineProvider, FaultKind, StreamEngine};
pub use error::{Error, PlaybackError, Result};
pub use player::AdaptiveVideoPlayer;
pub use surface::{RenderOutput, VideoElement, VideoSurface};
pub use types::{BindingState, EngineConfig, PlayerProps, SessionId, Strategy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Showreel Core initialized");
}
