//! Structured diagnostics emission
//!
//! Replaces ad-hoc console logging with an event stream the host can
//! subscribe to:
//! - strategy selection and state transitions
//! - quality/manifest information
//! - fault handling and recovery attempts

use crate::engine::FaultKind;
use crate::types::{BindingState, SessionId, Strategy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Diagnostic event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Capability probe picked a playback strategy
    StrategySelected { strategy: Strategy },

    /// Manifest parsed; quality ladder size known
    ManifestParsed { levels: usize },

    /// Engine switched quality levels
    QualitySwitched { height: u32 },

    /// Non-fatal fault left to the engine's self-recovery
    FaultIgnored { kind: FaultKind },

    /// In-place recovery issued for a fatal network/media fault
    RecoveryAttempted { kind: FaultKind },

    /// Binding state changed
    StateChanged {
        from: BindingState,
        to: BindingState,
    },

    /// Engine instance released
    SessionTornDown,

    /// Terminal failure; error panel rendered
    PlaybackFailed { code: String, message: String },
}

/// Diagnostic event with session metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackEventRecord {
    /// Unique event ID
    pub id: Uuid,
    /// Session ID
    pub session_id: SessionId,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Sequence number within the session
    pub sequence: u64,
    /// The event
    #[serde(flatten)]
    pub event: PlaybackEvent,
}

/// Collects and broadcasts playback diagnostics for one session
///
/// Emission is synchronous; records are buffered for pull-style
/// inspection and pushed to any live broadcast subscribers.
pub struct DiagnosticsEmitter {
    session_id: SessionId,
    inner: Mutex<EmitterInner>,
    event_tx: broadcast::Sender<PlaybackEventRecord>,
}

struct EmitterInner {
    sequence: u64,
    buffer: Vec<PlaybackEventRecord>,
}

impl DiagnosticsEmitter {
    /// Create a new emitter for a session
    pub fn new(session_id: SessionId) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            session_id,
            inner: Mutex::new(EmitterInner {
                sequence: 0,
                buffer: Vec::new(),
            }),
            event_tx,
        }
    }

    /// Emit a diagnostic event
    pub fn emit(&self, event: PlaybackEvent) {
        let record = {
            let mut inner = self.inner.lock().expect("diagnostics lock poisoned");
            inner.sequence += 1;
            let record = PlaybackEventRecord {
                id: Uuid::new_v4(),
                session_id: self.session_id,
                timestamp: Utc::now(),
                sequence: inner.sequence,
                event,
            };
            inner.buffer.push(record.clone());
            record
        };

        debug!(
            event_id = %record.id,
            session_id = %record.session_id,
            event = ?record.event,
            "Playback diagnostic"
        );

        // No subscribers is fine; the buffer still has the record
        let _ = self.event_tx.send(record);
    }

    /// Subscribe to diagnostics as they are emitted
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEventRecord> {
        self.event_tx.subscribe()
    }

    /// All records emitted so far
    pub fn events(&self) -> Vec<PlaybackEventRecord> {
        self.inner
            .lock()
            .expect("diagnostics lock poisoned")
            .buffer
            .clone()
    }

    /// Clear the record buffer
    pub fn clear(&self) {
        self.inner
            .lock()
            .expect("diagnostics lock poisoned")
            .buffer
            .clear();
    }

    /// Session this emitter belongs to
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_buffers_in_order() {
        let emitter = DiagnosticsEmitter::new(SessionId::new());

        emitter.emit(PlaybackEvent::StrategySelected {
            strategy: Strategy::Engine,
        });
        emitter.emit(PlaybackEvent::ManifestParsed { levels: 4 });

        let events = emitter.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);
        assert_eq!(events[1].event, PlaybackEvent::ManifestParsed { levels: 4 });
    }

    #[tokio::test]
    async fn test_broadcast_subscription() {
        let emitter = DiagnosticsEmitter::new(SessionId::new());
        let mut rx = emitter.subscribe();

        emitter.emit(PlaybackEvent::SessionTornDown);

        let record = rx.recv().await.unwrap();
        assert_eq!(record.event, PlaybackEvent::SessionTornDown);
        assert_eq!(record.session_id, emitter.session_id());
    }

    #[test]
    fn test_clear_empties_buffer() {
        let emitter = DiagnosticsEmitter::new(SessionId::new());
        emitter.emit(PlaybackEvent::SessionTornDown);
        emitter.clear();
        assert!(emitter.events().is_empty());

        // Sequence keeps counting across a clear
        emitter.emit(PlaybackEvent::SessionTornDown);
        assert_eq!(emitter.events()[0].sequence, 2);
    }

    #[test]
    fn test_record_serialization() {
        let emitter = DiagnosticsEmitter::new(SessionId::new());
        emitter.emit(PlaybackEvent::QualitySwitched { height: 720 });

        let json = serde_json::to_string(&emitter.events()[0]).unwrap();
        assert!(json.contains("\"event\":\"quality_switched\""));
        assert!(json.contains("\"height\":720"));
    }
}
