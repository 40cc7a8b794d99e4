//! Broadcast service
//!
//! The host process's command surface over the whole relay: it owns the
//! poller, the signaling client, and the heartbeat writer, wired together
//! by explicit construction: one service instance per process, passed by
//! reference, no ambient globals.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{ensure_container, BroadcastConfig, IceServerConfig};
use crate::consumer::{BroadcastEvent, MailboxPoller};
use crate::error::SignalingError;
use crate::mailbox::{now_epoch_secs, ControlBlock};
use crate::signaling::{IceCandidate, SignalingClient, SignalingEvent};

/// Event receivers handed to the service's caller
pub struct ServiceEvents {
    /// Broadcast lifecycle events from the poller
    pub broadcast: mpsc::Receiver<BroadcastEvent>,
    /// Signaling events from the client
    pub signaling: mpsc::Receiver<SignalingEvent>,
}

/// Host-process broadcast service
pub struct BroadcastService {
    config: BroadcastConfig,
    control: ControlBlock,
    poller: MailboxPoller,
    client: Arc<SignalingClient>,
    heartbeat: Option<JoinHandle<()>>,
}

impl BroadcastService {
    /// Create a service.
    ///
    /// Returns the service and the event receivers for its caller.
    pub fn new(config: BroadcastConfig) -> (Self, ServiceEvents) {
        let (poller, broadcast_rx) = MailboxPoller::new(config.clone());
        let (client, signaling_rx) = SignalingClient::new();

        let service = Self {
            control: ControlBlock::from_config(&config),
            poller,
            client: Arc::new(client),
            heartbeat: None,
            config,
        };

        (
            service,
            ServiceEvents {
                broadcast: broadcast_rx,
                signaling: signaling_rx,
            },
        )
    }

    /// The signaling client, for wiring media-engine notifications
    pub fn client(&self) -> &Arc<SignalingClient> {
        &self.client
    }

    /// Whether the poll loop is running
    pub fn is_broadcasting(&self) -> bool {
        self.poller.is_running()
    }

    /// Prepare for a broadcast: clear the mailbox, start polling, and start
    /// announcing host liveness.
    pub fn initialize_broadcast(&mut self) {
        if let Err(e) = ensure_container(&self.config.container_dir) {
            // The mailbox treats every miss as "no data yet", so a missing
            // container degrades to an idle poll loop rather than a failure
            tracing::warn!(error = %e, dir = %self.config.container_dir.display(),
                "Shared container unavailable");
        }

        let sink: Arc<dyn crate::consumer::FrameSink> = self.client.clone();
        self.poller.start(sink);
        self.start_heartbeat();

        tracing::info!("Broadcast initialized");
    }

    /// Create the local offer, returning its textual form
    pub fn create_offer(&self, ice_servers: &[IceServerConfig]) -> Result<String, SignalingError> {
        self.client.create_offer(ice_servers)
    }

    /// Apply the remote answer
    pub fn set_remote_answer(&self, sdp: &str) -> Result<(), SignalingError> {
        self.client.set_remote_answer(sdp)
    }

    /// Apply one remote ICE candidate
    pub fn add_remote_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SignalingError> {
        self.client.add_remote_ice_candidate(candidate)
    }

    /// Request a graceful end of the broadcast.
    ///
    /// Sets the shared stop flag for the capture process's watchdog, then
    /// stops the poller and the heartbeat writer.
    pub fn stop_broadcast(&mut self) {
        self.control.request_stop();
        self.poller.stop();

        if let Some(task) = self.heartbeat.take() {
            task.abort();
        }

        tracing::info!("Broadcast stopped");
    }

    fn start_heartbeat(&mut self) {
        if let Some(task) = self.heartbeat.take() {
            task.abort();
        }

        let control = self.control.clone();
        let period = self.config.heartbeat_period;
        self.heartbeat = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                control.write_heartbeat(now_epoch_secs());
            }
        }));
    }
}

impl Drop for BroadcastService {
    fn drop(&mut self) {
        if let Some(task) = self.heartbeat.take() {
            task.abort();
        }
    }
}
