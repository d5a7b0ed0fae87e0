//! Adaptive video player binding
//!
//! Owns one video surface and at most one live engine instance, and walks
//! the binding state machine:
//!
//! ```text
//! Uninitialized -(probe)-> NativeBound | EngineBound | Unsupported
//! EngineBound   -> Error          (terminal fatal fault)
//! any resting   -> Uninitialized  (source change; full teardown + re-probe)
//! ```

use crate::{
    diagnostics::{DiagnosticsEmitter, PlaybackEvent},
    engine::{EngineEvent, EngineFault, EngineProvider, FaultKind, StreamEngine},
    surface::{RenderOutput, VideoElement, VideoSurface},
    types::{BindingState, EngineConfig, PlayerProps, SessionId, Strategy},
    Error, PlaybackError, Result,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Adaptive bitrate playback binding for a single video surface
///
/// Created bound (the capability probe runs on mount), torn down
/// deterministically on source change, [`unmount`](Self::unmount), or drop.
/// Playback faults never surface as `Err`; they resolve in place to an
/// error panel in [`render`](Self::render). The `Result`s on the public
/// operations only report state-machine misuse.
pub struct AdaptiveVideoPlayer {
    /// Unique session ID
    id: SessionId,
    /// Input props; `source` is the only field that re-binds
    props: PlayerProps,
    /// The host's video surface
    surface: Arc<dyn VideoSurface>,
    /// Gateway to the software engine, if the runtime has one
    provider: Arc<dyn EngineProvider>,
    /// Fixed engine tuning
    config: EngineConfig,
    /// Single-slot engine cell; at most one live instance at a time
    engine: Option<Box<dyn StreamEngine>>,
    /// Whether the surface currently holds a direct native assignment
    native_bound: bool,
    /// Current binding state
    state: BindingState,
    /// State change broadcaster
    state_tx: watch::Sender<BindingState>,
    /// Terminal error, set at most once per session
    error: Option<PlaybackError>,
    /// Structured diagnostics
    diagnostics: Arc<DiagnosticsEmitter>,
}

impl AdaptiveVideoPlayer {
    /// Mount the player: store props and run the capability probe
    pub fn mount(
        props: PlayerProps,
        surface: Arc<dyn VideoSurface>,
        provider: Arc<dyn EngineProvider>,
    ) -> Result<Self> {
        let id = SessionId::new();
        let (state_tx, _) = watch::channel(BindingState::Uninitialized);

        let mut player = Self {
            id,
            props,
            surface,
            provider,
            config: EngineConfig::default(),
            engine: None,
            native_bound: false,
            state: BindingState::Uninitialized,
            state_tx,
            error: None,
            diagnostics: Arc::new(DiagnosticsEmitter::new(id)),
        };
        player.bind()?;
        Ok(player)
    }

    /// Get session ID
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Get current binding state
    pub fn state(&self) -> BindingState {
        self.state
    }

    /// Get the terminal error, if one is set
    pub fn error(&self) -> Option<PlaybackError> {
        self.error
    }

    /// Get current props
    pub fn props(&self) -> &PlayerProps {
        &self.props
    }

    /// Subscribe to binding state changes
    pub fn subscribe_state(&self) -> watch::Receiver<BindingState> {
        self.state_tx.subscribe()
    }

    /// Diagnostics emitter for this session
    pub fn diagnostics(&self) -> Arc<DiagnosticsEmitter> {
        Arc::clone(&self.diagnostics)
    }

    /// Transition to new state
    fn set_state(&mut self, new_state: BindingState) -> Result<()> {
        if self.state == new_state {
            return Ok(());
        }
        if !self.state.can_transition_to(new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            });
        }

        let from = self.state;
        self.state = new_state;
        let _ = self.state_tx.send(new_state);
        self.diagnostics
            .emit(PlaybackEvent::StateChanged { from, to: new_state });
        info!(session_id = %self.id, from = %from, to = %new_state, "State transition");
        Ok(())
    }

    /// Probe capability and establish a binding for the current source
    ///
    /// Strategy order: native surface support first, then the software
    /// engine, else the unsupported panel.
    #[instrument(skip(self), fields(session_id = %self.id, source = %self.props.source))]
    fn bind(&mut self) -> Result<()> {
        if self.surface.supports_native_hls() {
            self.surface.set_source(&self.props.source);
            self.native_bound = true;
            self.diagnostics.emit(PlaybackEvent::StrategySelected {
                strategy: Strategy::Native,
            });
            info!("Using native adaptive playback");
            self.set_state(BindingState::NativeBound)
        } else if self.provider.is_supported() {
            let mut engine = self.provider.create(&self.config);
            engine.load_source(&self.props.source);
            engine.attach_media(Arc::clone(&self.surface));
            self.engine = Some(engine);
            self.diagnostics.emit(PlaybackEvent::StrategySelected {
                strategy: Strategy::Engine,
            });
            info!("Using software engine for playback");
            self.set_state(BindingState::EngineBound)
        } else {
            self.fail(PlaybackError::Unsupported);
            warn!("No playback strategy available");
            self.set_state(BindingState::Unsupported)
        }
    }

    /// Replace the source: full teardown of the current binding, then
    /// re-probe
    ///
    /// The prior engine instance is destroyed before its replacement is
    /// constructed; the surface is never shared between two bindings.
    #[instrument(skip(self, source), fields(session_id = %self.id))]
    pub fn set_source(&mut self, source: Url) -> Result<()> {
        info!(source = %source, "Source change");
        self.release();
        self.set_state(BindingState::Uninitialized)?;
        self.error = None;
        self.props.source = source;
        self.bind()
    }

    /// Tear down the current binding without establishing a new one
    ///
    /// Idempotent: calling this twice, or after a terminal fault already
    /// released the engine, is a no-op. Any terminal error is cleared
    /// along with the binding it described.
    pub fn teardown(&mut self) -> Result<()> {
        self.release();
        self.error = None;
        self.set_state(BindingState::Uninitialized)
    }

    /// Consume the player, releasing any live binding
    pub fn unmount(mut self) {
        self.release();
    }

    /// Release the engine slot and detach any native binding
    ///
    /// Both halves are consumed on first release, so a second pass (for
    /// example `unmount` followed by drop) touches nothing.
    fn release(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
            self.diagnostics.emit(PlaybackEvent::SessionTornDown);
            debug!(session_id = %self.id, "Engine instance destroyed");
        }
        if self.native_bound {
            self.surface.clear_source();
            self.native_bound = false;
            self.diagnostics.emit(PlaybackEvent::SessionTornDown);
            debug!(session_id = %self.id, "Native binding detached");
        }
    }

    /// Record the terminal error and emit the failure diagnostic
    fn fail(&mut self, error: PlaybackError) {
        self.diagnostics.emit(PlaybackEvent::PlaybackFailed {
            code: error.error_code().to_string(),
            message: error.user_message(),
        });
        self.error = Some(error);
    }

    /// Feed an engine event into the component
    ///
    /// Only meaningful on the engine path; events arriving after the
    /// engine has been released are ignored rather than faulted.
    pub fn handle_engine_event(&mut self, event: EngineEvent) -> Result<()> {
        if self.engine.is_none() {
            debug!(session_id = %self.id, ?event, "Engine event with no live engine, ignoring");
            return Ok(());
        }

        match event {
            EngineEvent::ManifestParsed { levels } => {
                info!(session_id = %self.id, levels, "Manifest parsed");
                self.diagnostics
                    .emit(PlaybackEvent::ManifestParsed { levels });
                Ok(())
            }
            EngineEvent::LevelSwitched { height } => {
                debug!(session_id = %self.id, height, "Quality switched to {height}p");
                self.diagnostics
                    .emit(PlaybackEvent::QualitySwitched { height });
                Ok(())
            }
            EngineEvent::Fault(fault) => self.handle_fault(fault),
        }
    }

    /// Dispatch an engine fault
    ///
    /// Non-fatal faults are the engine's own problem. Fatal network and
    /// media faults are recovered in place on the same instance; any other
    /// fatal classification releases the engine and is terminal.
    fn handle_fault(&mut self, fault: EngineFault) -> Result<()> {
        if !fault.fatal {
            debug!(session_id = %self.id, kind = %fault.kind, detail = %fault.detail,
                "Transient fault, engine self-recovers");
            self.diagnostics
                .emit(PlaybackEvent::FaultIgnored { kind: fault.kind });
            return Ok(());
        }

        match fault.kind {
            FaultKind::Network => {
                warn!(session_id = %self.id, detail = %fault.detail,
                    "Fatal network fault, reloading source");
                if let Some(engine) = self.engine.as_mut() {
                    engine.start_load();
                }
                self.diagnostics.emit(PlaybackEvent::RecoveryAttempted {
                    kind: FaultKind::Network,
                });
                Ok(())
            }
            FaultKind::Media => {
                warn!(session_id = %self.id, detail = %fault.detail,
                    "Fatal media fault, attempting in-place recovery");
                if let Some(engine) = self.engine.as_mut() {
                    engine.recover_media_error();
                }
                self.diagnostics.emit(PlaybackEvent::RecoveryAttempted {
                    kind: FaultKind::Media,
                });
                Ok(())
            }
            FaultKind::Other => {
                warn!(session_id = %self.id, detail = %fault.detail,
                    "Fatal engine fault, destroying instance");
                self.release();
                self.fail(PlaybackError::FatalEngine);
                self.set_state(BindingState::Error)
            }
        }
    }

    /// What the component currently presents
    pub fn render(&self) -> RenderOutput {
        match self.error {
            Some(error) => RenderOutput::error_panel(error, self.props.style_class.clone()),
            None => RenderOutput::Video(VideoElement::from_props(&self.props)),
        }
    }
}

impl Drop for AdaptiveVideoPlayer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimProvider, SimSurface};

    fn props() -> PlayerProps {
        PlayerProps::new("https://cdn.example.com/show/master.m3u8").unwrap()
    }

    fn fatal(kind: FaultKind) -> EngineEvent {
        EngineEvent::Fault(EngineFault::fatal(kind, "test fault"))
    }

    #[test]
    fn test_native_path_skips_engine() {
        let surface = SimSurface::native();
        let provider = SimProvider::supported();
        let player =
            AdaptiveVideoPlayer::mount(props(), surface.clone(), provider.clone()).unwrap();

        assert_eq!(player.state(), BindingState::NativeBound);
        assert_eq!(surface.sources().len(), 1);
        assert_eq!(provider.log().created, 0);
        assert!(!player.render().is_error());
    }

    #[test]
    fn test_engine_path_loads_then_attaches() {
        let surface = SimSurface::plain();
        let provider = SimProvider::supported();
        let player =
            AdaptiveVideoPlayer::mount(props(), surface.clone(), provider.clone()).unwrap();

        assert_eq!(player.state(), BindingState::EngineBound);
        let log = provider.log();
        assert_eq!(log.created, 1);
        assert_eq!(log.load_source, 1);
        assert_eq!(log.attach_media, 1);
        assert_eq!(
            log.last_source.as_deref(),
            Some("https://cdn.example.com/show/master.m3u8")
        );
        // Native assignment never happened
        assert!(surface.sources().is_empty());
    }

    #[test]
    fn test_unsupported_constructs_zero_engines() {
        let surface = SimSurface::plain();
        let provider = SimProvider::unsupported();
        let player =
            AdaptiveVideoPlayer::mount(props(), surface, provider.clone()).unwrap();

        assert_eq!(player.state(), BindingState::Unsupported);
        assert_eq!(provider.log().created, 0);
        match player.render() {
            RenderOutput::ErrorPanel { message, .. } => {
                assert_eq!(message, "HLS is not supported in this browser");
            }
            other => panic!("expected error panel, got {other:?}"),
        }
    }

    #[test]
    fn test_source_change_tears_down_exactly_once() {
        let surface = SimSurface::plain();
        let provider = SimProvider::supported();
        let mut player =
            AdaptiveVideoPlayer::mount(props(), surface, provider.clone()).unwrap();

        player
            .set_source(Url::parse("https://cdn.example.com/other/master.m3u8").unwrap())
            .unwrap();

        let log = provider.log();
        assert_eq!(log.destroy, 1);
        assert_eq!(log.created, 2);
        assert_eq!(log.load_source, 2);
        assert_eq!(
            log.last_source.as_deref(),
            Some("https://cdn.example.com/other/master.m3u8")
        );
        assert_eq!(player.state(), BindingState::EngineBound);
    }

    #[test]
    fn test_fatal_network_retries_in_place() {
        let surface = SimSurface::plain();
        let provider = SimProvider::supported();
        let mut player =
            AdaptiveVideoPlayer::mount(props(), surface, provider.clone()).unwrap();

        player.handle_engine_event(fatal(FaultKind::Network)).unwrap();

        let log = provider.log();
        assert_eq!(log.start_load, 1);
        assert_eq!(log.destroy, 0);
        assert_eq!(player.state(), BindingState::EngineBound);
        assert!(player.error().is_none());
    }

    #[test]
    fn test_fatal_media_recovers_in_place() {
        let surface = SimSurface::plain();
        let provider = SimProvider::supported();
        let mut player =
            AdaptiveVideoPlayer::mount(props(), surface, provider.clone()).unwrap();

        player.handle_engine_event(fatal(FaultKind::Media)).unwrap();

        let log = provider.log();
        assert_eq!(log.recover_media_error, 1);
        assert_eq!(log.destroy, 0);
        assert_eq!(player.state(), BindingState::EngineBound);
    }

    #[test]
    fn test_fatal_other_is_terminal() {
        let surface = SimSurface::plain();
        let provider = SimProvider::supported();
        let mut player =
            AdaptiveVideoPlayer::mount(props(), surface, provider.clone()).unwrap();

        player.handle_engine_event(fatal(FaultKind::Other)).unwrap();

        assert_eq!(provider.log().destroy, 1);
        assert_eq!(player.state(), BindingState::Error);
        assert_eq!(player.error(), Some(PlaybackError::FatalEngine));
        match player.render() {
            RenderOutput::ErrorPanel { message, .. } => {
                assert_eq!(message, "Unable to load video. Please try again later.");
            }
            other => panic!("expected error panel, got {other:?}"),
        }

        // Late events after release reach nothing
        player.handle_engine_event(fatal(FaultKind::Network)).unwrap();
        let log = provider.log();
        assert_eq!(log.start_load, 0);
        assert_eq!(log.destroy, 1);
    }

    #[test]
    fn test_nonfatal_fault_ignored() {
        let surface = SimSurface::plain();
        let provider = SimProvider::supported();
        let mut player =
            AdaptiveVideoPlayer::mount(props(), surface, provider.clone()).unwrap();

        player
            .handle_engine_event(EngineEvent::Fault(EngineFault::transient(
                FaultKind::Network,
                "segment stall",
            )))
            .unwrap();

        let log = provider.log();
        assert_eq!(log.start_load, 0);
        assert_eq!(log.recover_media_error, 0);
        assert_eq!(log.destroy, 0);
        assert_eq!(player.state(), BindingState::EngineBound);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let surface = SimSurface::plain();
        let provider = SimProvider::supported();
        let mut player =
            AdaptiveVideoPlayer::mount(props(), surface, provider.clone()).unwrap();

        player.teardown().unwrap();
        player.teardown().unwrap();

        assert_eq!(provider.log().destroy, 1);
        assert_eq!(player.state(), BindingState::Uninitialized);
    }

    #[test]
    fn test_unmount_after_teardown_does_not_double_release() {
        let surface = SimSurface::plain();
        let provider = SimProvider::supported();
        let mut player =
            AdaptiveVideoPlayer::mount(props(), surface, provider.clone()).unwrap();

        player.teardown().unwrap();
        player.unmount();

        assert_eq!(provider.log().destroy, 1);
    }

    #[test]
    fn test_drop_releases_engine() {
        let surface = SimSurface::plain();
        let provider = SimProvider::supported();
        {
            let _player =
                AdaptiveVideoPlayer::mount(props(), surface, provider.clone()).unwrap();
        }
        assert_eq!(provider.log().destroy, 1);
    }

    #[test]
    fn test_native_teardown_clears_surface() {
        let surface = SimSurface::native();
        let provider = SimProvider::supported();
        let mut player =
            AdaptiveVideoPlayer::mount(props(), surface.clone(), provider).unwrap();

        player.teardown().unwrap();
        assert_eq!(surface.clears(), 1);
    }

    #[test]
    fn test_unmount_native_clears_surface_once() {
        let surface = SimSurface::native();
        let provider = SimProvider::supported();
        let player =
            AdaptiveVideoPlayer::mount(props(), surface.clone(), provider).unwrap();

        // unmount runs the release, then drop runs; the detach must not repeat
        player.unmount();
        assert_eq!(surface.clears(), 1);
    }

    #[test]
    fn test_native_drop_clears_surface_once() {
        let surface = SimSurface::native();
        let provider = SimProvider::supported();
        {
            let _player =
                AdaptiveVideoPlayer::mount(props(), surface.clone(), provider).unwrap();
        }
        assert_eq!(surface.clears(), 1);
    }

    #[test]
    fn test_teardown_clears_terminal_error() {
        let surface = SimSurface::plain();
        let provider = SimProvider::supported();
        let mut player =
            AdaptiveVideoPlayer::mount(props(), surface, provider).unwrap();

        player.handle_engine_event(fatal(FaultKind::Other)).unwrap();
        assert_eq!(player.state(), BindingState::Error);

        player.teardown().unwrap();
        assert_eq!(player.state(), BindingState::Uninitialized);
        assert!(player.error().is_none());
        assert!(!player.render().is_error());
    }

    #[test]
    fn test_native_teardown_emits_diagnostic() {
        let surface = SimSurface::native();
        let provider = SimProvider::supported();
        let mut player =
            AdaptiveVideoPlayer::mount(props(), surface, provider).unwrap();

        player.teardown().unwrap();

        let events: Vec<_> = player
            .diagnostics()
            .events()
            .into_iter()
            .filter(|r| r.event == PlaybackEvent::SessionTornDown)
            .collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_source_change_recovers_from_error_state() {
        let surface = SimSurface::plain();
        let provider = SimProvider::supported();
        let mut player =
            AdaptiveVideoPlayer::mount(props(), surface, provider.clone()).unwrap();

        player.handle_engine_event(fatal(FaultKind::Other)).unwrap();
        assert_eq!(player.state(), BindingState::Error);

        player
            .set_source(Url::parse("https://cdn.example.com/retry/master.m3u8").unwrap())
            .unwrap();

        assert_eq!(player.state(), BindingState::EngineBound);
        assert!(player.error().is_none());
        assert!(!player.render().is_error());
        assert_eq!(provider.log().created, 2);
    }
}
