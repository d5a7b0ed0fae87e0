//! Deterministic stand-ins for the playback collaborators
//!
//! Used by the test suites and by `showreel-cli` to exercise the binding
//! headlessly: a surface with a configurable native-capability answer, an
//! engine provider that counts every call it receives, and replayable
//! fault scenarios.

use crate::engine::{EngineEvent, EngineFault, EngineProvider, FaultKind, StreamEngine};
use crate::player::AdaptiveVideoPlayer;
use crate::surface::VideoSurface;
use crate::types::EngineConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use url::Url;

/// Simulated video surface
pub struct SimSurface {
    native: bool,
    sources: Mutex<Vec<Url>>,
    clears: Mutex<usize>,
}

impl SimSurface {
    /// Surface that reports native adaptive-streaming capability
    pub fn native() -> Arc<Self> {
        Arc::new(Self {
            native: true,
            sources: Mutex::new(Vec::new()),
            clears: Mutex::new(0),
        })
    }

    /// Surface without native capability
    pub fn plain() -> Arc<Self> {
        Arc::new(Self {
            native: false,
            sources: Mutex::new(Vec::new()),
            clears: Mutex::new(0),
        })
    }

    /// Every source assigned directly to the surface, in order
    pub fn sources(&self) -> Vec<Url> {
        self.sources.lock().expect("sim lock poisoned").clone()
    }

    /// How many times the direct assignment was cleared
    pub fn clears(&self) -> usize {
        *self.clears.lock().expect("sim lock poisoned")
    }
}

impl VideoSurface for SimSurface {
    fn supports_native_hls(&self) -> bool {
        self.native
    }

    fn set_source(&self, source: &Url) {
        self.sources
            .lock()
            .expect("sim lock poisoned")
            .push(source.clone());
    }

    fn clear_source(&self) {
        *self.clears.lock().expect("sim lock poisoned") += 1;
    }
}

/// Call counts across every engine a [`SimProvider`] handed out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineCallLog {
    pub created: usize,
    pub load_source: usize,
    pub attach_media: usize,
    pub start_load: usize,
    pub recover_media_error: usize,
    pub destroy: usize,
    /// Most recent source passed to `load_source`
    pub last_source: Option<String>,
    /// Tuning the most recent engine was constructed with
    pub last_config: Option<EngineConfig>,
}

/// Simulated engine provider
pub struct SimProvider {
    supported: bool,
    log: Arc<Mutex<EngineCallLog>>,
}

impl SimProvider {
    pub fn supported() -> Arc<Self> {
        Arc::new(Self {
            supported: true,
            log: Arc::new(Mutex::new(EngineCallLog::default())),
        })
    }

    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self {
            supported: false,
            log: Arc::new(Mutex::new(EngineCallLog::default())),
        })
    }

    /// Snapshot of the call log
    pub fn log(&self) -> EngineCallLog {
        self.log.lock().expect("sim lock poisoned").clone()
    }
}

impl EngineProvider for SimProvider {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, config: &EngineConfig) -> Box<dyn StreamEngine> {
        let mut log = self.log.lock().expect("sim lock poisoned");
        log.created += 1;
        log.last_config = Some(config.clone());
        Box::new(SimEngine {
            log: Arc::clone(&self.log),
        })
    }
}

/// Simulated engine; records every call against the provider's shared log
struct SimEngine {
    log: Arc<Mutex<EngineCallLog>>,
}

impl StreamEngine for SimEngine {
    fn load_source(&mut self, source: &Url) {
        let mut log = self.log.lock().expect("sim lock poisoned");
        log.load_source += 1;
        log.last_source = Some(source.to_string());
    }

    fn attach_media(&mut self, _surface: Arc<dyn VideoSurface>) {
        self.log.lock().expect("sim lock poisoned").attach_media += 1;
    }

    fn start_load(&mut self) {
        self.log.lock().expect("sim lock poisoned").start_load += 1;
    }

    fn recover_media_error(&mut self) {
        self.log.lock().expect("sim lock poisoned").recover_media_error += 1;
    }

    fn destroy(&mut self) {
        self.log.lock().expect("sim lock poisoned").destroy += 1;
    }
}

/// A replayable sequence of engine events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub events: Vec<EngineEvent>,
}

impl Scenario {
    /// Parse a scenario from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidScenario(e.to_string()))
    }

    /// Built-in scenario covering the fault-handling paths: a healthy
    /// start, one transient fault, both in-place recoveries, then a
    /// terminal fault.
    pub fn fault_run() -> Self {
        Self {
            events: vec![
                EngineEvent::ManifestParsed { levels: 4 },
                EngineEvent::LevelSwitched { height: 720 },
                EngineEvent::Fault(EngineFault::transient(FaultKind::Network, "segment stall")),
                EngineEvent::Fault(EngineFault::fatal(FaultKind::Network, "manifest timeout")),
                EngineEvent::Fault(EngineFault::fatal(FaultKind::Media, "decode error")),
                EngineEvent::Fault(EngineFault::fatal(FaultKind::Other, "internal exception")),
            ],
        }
    }

    /// Replay every event through the player in order
    pub fn replay(&self, player: &mut AdaptiveVideoPlayer) -> Result<()> {
        for event in &self.events {
            player.handle_engine_event(event.clone())?;
        }
        Ok(())
    }
}
