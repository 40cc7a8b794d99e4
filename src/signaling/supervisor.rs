//! Connection supervisor
//!
//! Owns the one live media session and heals it: on any qualifying ICE
//! failure the current session is marked dropped, released, and atomically
//! replaced by a brand-new one under the same lock, so no two sessions can
//! ever accept frames concurrently. Reconnection is always a full rebuild,
//! never incremental renegotiation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::codec::{FrameBuffer, Orientation};
use crate::config::IceServerConfig;
use crate::error::SignalingError;

use super::client::SignalingEvent;
use super::ice::{IceCandidate, IceConnectionState};
use super::session::{MediaSession, SessionPhase};

/// Supervises the lifecycle of the media session
pub struct ConnectionSupervisor {
    session: Mutex<MediaSession>,
    next_session_id: AtomicU64,
    event_tx: mpsc::Sender<SignalingEvent>,
}

impl ConnectionSupervisor {
    /// Create a supervisor with its first session already constructed
    pub fn new(event_tx: mpsc::Sender<SignalingEvent>) -> Self {
        Self {
            session: Mutex::new(MediaSession::new(1)),
            next_session_id: AtomicU64::new(2),
            event_tx,
        }
    }

    /// Id of the session currently accepting operations
    pub fn current_session_id(&self) -> u64 {
        self.with_session(|s| s.id())
    }

    /// Phase of the current session
    pub fn current_phase(&self) -> SessionPhase {
        self.with_session(|s| s.phase())
    }

    /// Whether the current session accepts frames
    pub fn is_connected(&self) -> bool {
        self.current_phase() == SessionPhase::Connected
    }

    /// Create the local offer on the current session.
    ///
    /// Setting the local description is itself a signaling-state change,
    /// which optimistically latches the session connected.
    pub fn create_offer(&self, ice_servers: &[IceServerConfig]) -> Result<String, SignalingError> {
        let offer = self.with_session(|s| s.create_offer(ice_servers))?;
        self.on_signaling_state_change();
        Ok(offer)
    }

    /// Apply a remote answer to the current session
    pub fn set_remote_answer(&self, sdp: &str) -> Result<(), SignalingError> {
        let result = self.with_session(|s| s.set_remote_answer(sdp));
        if result.is_ok() {
            self.on_signaling_state_change();
        }
        result
    }

    /// Apply one remote ICE candidate to the current session
    pub fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<(), SignalingError> {
        self.with_session(|s| s.add_remote_candidate(candidate))
    }

    /// Ingest a frame into the current session; returns whether accepted
    pub fn push_frame(&self, timestamp_ns: i64, orientation: Orientation, buffer: &FrameBuffer) -> bool {
        self.with_session(|s| s.push_frame(timestamp_ns, orientation, buffer))
    }

    /// Record a signaling-state change on the current session
    pub fn on_signaling_state_change(&self) {
        self.with_session(|s| s.on_signaling_state_change());
    }

    /// React to an ICE connection-state report from the media engine.
    ///
    /// Non-qualifying states are informational. Qualifying states drop the
    /// session and swap in a replacement atomically.
    pub fn on_ice_state(&self, state: IceConnectionState) {
        if !state.requires_rebuild() {
            tracing::debug!(state = %state, "ICE state report");
            return;
        }

        let dropped_phase = match state {
            IceConnectionState::Disconnected => SessionPhase::Disconnected,
            IceConnectionState::Failed => SessionPhase::Failed,
            _ => SessionPhase::Closed,
        };

        let new_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let (old_id, frames) = {
            let mut guard = self
                .session
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let mut old = std::mem::replace(&mut *guard, MediaSession::new(new_id));
            old.mark_dropped(dropped_phase);
            (old.id(), old.track().frames_ingested())
            // `old` falls out of scope here: the dropped session releases
            // its track with it, inside the lock, before any frame can
            // reach the replacement.
        };

        tracing::warn!(
            state = %state,
            old_session = old_id,
            new_session = new_id,
            frames_ingested = frames,
            "Session dropped, replacement constructed"
        );

        if self
            .event_tx
            .try_send(SignalingEvent::SessionReplaced {
                old_id,
                new_id,
            })
            .is_err()
        {
            tracing::debug!("Session-replaced event not delivered");
        }
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut MediaSession) -> R) -> R {
        let mut guard = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}
