//! Mailbox poller
//!
//! Runs in the host process. A fixed-rate timer (~30 Hz) reads the mailbox
//! each tick, infers broadcast start/stop from clean/dirty content
//! transitions, and hands decoded frames to the frame sink. Every failure
//! class (unreachable mailbox, torn record, malformed header) means "skip
//! this tick"; the loop itself never stops because of a bad frame.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::codec::{deserialize, FrameBuffer, Orientation, FRAME_TAG};
use crate::config::BroadcastConfig;
use crate::mailbox::FrameMailbox;
use crate::stats::RelayStats;

/// Receiver of decoded frames (implemented by the signaling client)
pub trait FrameSink: Send + Sync + 'static {
    /// Called once per successfully decoded frame.
    ///
    /// Implementations must not block: the poller calls this on its timer
    /// task, and an implementation that cannot use the frame simply drops it.
    fn on_frame(&self, timestamp_ns: i64, orientation: Orientation, buffer: FrameBuffer);
}

/// Broadcast lifecycle events inferred from mailbox content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastEvent {
    /// Mailbox went clean → dirty: the capture process started writing
    Started,
    /// Mailbox went dirty → clean: the session ended (mailbox was cleared)
    Stopped,
}

/// Host-process mailbox poller
pub struct MailboxPoller {
    config: BroadcastConfig,
    mailbox: FrameMailbox,
    stats: Arc<RelayStats>,
    event_tx: mpsc::Sender<BroadcastEvent>,
    task: Option<JoinHandle<()>>,
}

impl MailboxPoller {
    /// Create a poller.
    ///
    /// Returns the poller and a receiver for lifecycle events.
    pub fn new(config: BroadcastConfig) -> (Self, mpsc::Receiver<BroadcastEvent>) {
        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let poller = Self {
            mailbox: FrameMailbox::from_config(&config),
            stats: Arc::new(RelayStats::new()),
            event_tx: tx,
            task: None,
            config,
        };

        (poller, rx)
    }

    /// Shared relay counters
    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.stats
    }

    /// Whether the poll loop is currently running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Start polling.
    ///
    /// Clears the mailbox and resets lifecycle state first, guaranteeing
    /// that no leftover frame from a prior session produces a spurious
    /// start event. Restarting an already-running poller replaces its task.
    pub fn start(&mut self, sink: Arc<dyn FrameSink>) {
        self.stop();
        self.mailbox.clear();

        let mailbox = self.mailbox.clone();
        let stats = Arc::clone(&self.stats);
        let event_tx = self.event_tx.clone();
        let period = self.config.poll_period;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let mut broadcast_active = false;

            loop {
                ticker.tick().await;
                poll_once(&mailbox, &sink, &stats, &event_tx, &mut broadcast_active).await;
            }
        }));

        tracing::info!(period_ms = self.config.poll_period.as_millis() as u64, "Poller started");
    }

    /// Stop polling and reset lifecycle state.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!(stats = ?self.stats.snapshot(), "Poller stopped");
        }
    }
}

impl Drop for MailboxPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One poll cycle: read, edge-detect, decode, forward.
async fn poll_once(
    mailbox: &FrameMailbox,
    sink: &Arc<dyn FrameSink>,
    stats: &Arc<RelayStats>,
    event_tx: &mpsc::Sender<BroadcastEvent>,
    broadcast_active: &mut bool,
) {
    // One read per tick; its prefix also answers the clean/dirty question.
    let Some(record) = mailbox.read_record() else {
        return;
    };

    let clean = record[..FRAME_TAG.len()].iter().all(|b| *b == 0);
    if clean {
        if *broadcast_active {
            *broadcast_active = false;
            tracing::info!("Mailbox cleared, broadcast ended");
            let _ = event_tx.send(BroadcastEvent::Stopped).await;
        }
        return;
    }

    if !*broadcast_active {
        *broadcast_active = true;
        tracing::info!("First frame observed, broadcast started");
        let _ = event_tx.send(BroadcastEvent::Started).await;
    }

    match deserialize(&record) {
        Ok(decoded) => {
            stats.record_decoded();
            sink.on_frame(decoded.header.timestamp_ns, decoded.orientation, decoded.buffer);
        }
        Err(e) => {
            // Expected under lock-free concurrent overwrite; drop and move on
            stats.record_decode_failure();
            tracing::debug!(error = %e, "Frame dropped");
        }
    }
}
