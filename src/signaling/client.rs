//! Signaling client
//!
//! The host-facing surface of the media stack: negotiates the session,
//! ingests decoded frames from the poller, and relays engine notifications
//! to the connection supervisor. Locally discovered ICE candidates leave
//! through the event channel in transport-neutral JSON; how they reach the
//! remote server is the transport collaborator's business.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::codec::{FrameBuffer, Orientation};
use crate::config::IceServerConfig;
use crate::consumer::FrameSink;
use crate::error::SignalingError;
use crate::stats::RelayStats;

use super::ice::{IceCandidate, IceConnectionState};
use super::supervisor::ConnectionSupervisor;

/// Events from the signaling client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingEvent {
    /// A locally discovered ICE candidate, serialized for the transport
    LocalCandidate(String),

    /// The supervisor replaced the session after an ICE failure
    SessionReplaced { old_id: u64, new_id: u64 },
}

/// Real-time media signaling client
///
/// # Example
/// ```no_run
/// use screenbridge::config::IceServerConfig;
/// use screenbridge::signaling::SignalingClient;
///
/// # fn example() -> Result<(), screenbridge::error::SignalingError> {
/// let (client, mut events) = SignalingClient::new();
///
/// tokio::spawn(async move {
///     while let Some(event) = events.recv().await {
///         println!("Event: {:?}", event);
///     }
/// });
///
/// let servers = [IceServerConfig::stun("stun:stun.example.org:3478")];
/// let offer = client.create_offer(&servers)?;
/// // hand `offer` to the signaling transport...
/// # Ok(())
/// # }
/// ```
pub struct SignalingClient {
    supervisor: ConnectionSupervisor,
    stats: Arc<RelayStats>,
    event_tx: mpsc::Sender<SignalingEvent>,
}

impl SignalingClient {
    /// Create a client.
    ///
    /// Returns the client and a receiver for signaling events.
    pub fn new() -> (Self, mpsc::Receiver<SignalingEvent>) {
        let (tx, rx) = mpsc::channel(256);

        let client = Self {
            supervisor: ConnectionSupervisor::new(tx.clone()),
            stats: Arc::new(RelayStats::new()),
            event_tx: tx,
        };

        (client, rx)
    }

    /// Shared relay counters
    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.stats
    }

    /// Id of the current session
    pub fn session_id(&self) -> u64 {
        self.supervisor.current_session_id()
    }

    /// Whether the current session accepts frames
    pub fn is_connected(&self) -> bool {
        self.supervisor.is_connected()
    }

    /// Create the local offer, returning its textual form
    pub fn create_offer(&self, ice_servers: &[IceServerConfig]) -> Result<String, SignalingError> {
        self.supervisor.create_offer(ice_servers)
    }

    /// Apply the remote answer
    pub fn set_remote_answer(&self, sdp: &str) -> Result<(), SignalingError> {
        self.supervisor.set_remote_answer(sdp)
    }

    /// Apply one remote ICE candidate
    pub fn add_remote_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SignalingError> {
        self.supervisor.add_remote_candidate(candidate)
    }

    /// Ingest a frame; returns whether the session accepted it
    pub fn push_frame(&self, timestamp_ns: i64, orientation: Orientation, buffer: &FrameBuffer) -> bool {
        let accepted = self.supervisor.push_frame(timestamp_ns, orientation, buffer);
        if accepted {
            self.stats.record_pushed();
        }
        accepted
    }

    /// Relay an ICE connection-state report from the media engine
    pub fn notify_ice_state(&self, state: IceConnectionState) {
        self.supervisor.on_ice_state(state);
    }

    /// Relay a signaling-state change report from the media engine
    pub fn notify_signaling_state_change(&self) {
        self.supervisor.on_signaling_state_change();
    }

    /// Relay a locally discovered ICE candidate out to the transport
    pub fn notify_local_candidate(&self, candidate: IceCandidate) {
        let serialized = candidate.to_json();
        if self
            .event_tx
            .try_send(SignalingEvent::LocalCandidate(serialized))
            .is_err()
        {
            tracing::debug!("Local candidate event not delivered");
        }
    }
}

impl FrameSink for SignalingClient {
    fn on_frame(&self, timestamp_ns: i64, orientation: Orientation, buffer: FrameBuffer) {
        // An unconnected session discards frames rather than buffering them
        self.push_frame(timestamp_ns, orientation, &buffer);
    }
}
