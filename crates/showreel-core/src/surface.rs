//! Video surface collaborator and render output
//!
//! The surface is supplied by the host rendering layer. The player never
//! assumes anything about it beyond this trait: a capability probe, a
//! direct source assignment for the native path, and a detach.

use crate::types::PlayerProps;
use crate::PlaybackError;
use serde::{Deserialize, Serialize};
use url::Url;

/// A video surface owned by the host
///
/// Implementations use interior mutability: the player holds an
/// `Arc<dyn VideoSurface>` and hands a clone to the engine on attach, so
/// both sides see the same underlying element.
pub trait VideoSurface: Send + Sync {
    /// Whether the surface can play an adaptive manifest natively
    fn supports_native_hls(&self) -> bool;

    /// Assign the source directly (native path)
    fn set_source(&self, source: &Url);

    /// Drop any direct source assignment
    fn clear_source(&self);
}

/// What the component presents: a video block or an in-place error panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderOutput {
    Video(VideoElement),
    ErrorPanel {
        message: String,
        style_class: Option<String>,
    },
}

impl RenderOutput {
    pub fn is_error(&self) -> bool {
        matches!(self, RenderOutput::ErrorPanel { .. })
    }

    pub(crate) fn error_panel(error: PlaybackError, style_class: Option<String>) -> Self {
        RenderOutput::ErrorPanel {
            message: error.user_message(),
            style_class,
        }
    }
}

/// Description of the rendered video block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoElement {
    pub poster: Option<Url>,
    pub autoplay: bool,
    pub muted: bool,
    pub controls: bool,
    pub style_class: Option<String>,
    /// Play inline rather than fullscreen on handheld surfaces
    pub plays_inline: bool,
    /// Nothing is fetched until playback is requested
    pub preload: bool,
}

impl VideoElement {
    pub(crate) fn from_props(props: &PlayerProps) -> Self {
        Self {
            poster: props.poster.clone(),
            autoplay: props.autoplay,
            muted: props.muted,
            controls: props.show_controls,
            style_class: props.style_class.clone(),
            plays_inline: true,
            preload: false,
        }
    }
}
