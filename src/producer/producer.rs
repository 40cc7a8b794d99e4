//! Frame producer
//!
//! Runs inside the sandboxed capture process. Every captured video sample is
//! serialized and written over the mailbox slot; audio samples are accepted
//! and discarded. The producer also runs the watchdog that honors the host's
//! stop request.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::codec::{serialize, serialized_len, FrameBuffer, Orientation};
use crate::config::BroadcastConfig;
use crate::error::{Error, Result};
use crate::mailbox::{ControlBlock, FrameMailbox};
use crate::stats::RelayStats;

use super::watchdog::Watchdog;

/// Sample buffer category delivered by the capture framework
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCategory {
    /// Screen video
    Video,
    /// Application audio
    AppAudio,
    /// Microphone audio
    MicAudio,
}

impl SampleCategory {
    /// Decode the framework's category code
    ///
    /// `None` means the framework broke its contract; callers must treat
    /// that as fatal, not as a recoverable runtime error.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(SampleCategory::Video),
            1 => Some(SampleCategory::AppAudio),
            2 => Some(SampleCategory::MicAudio),
            _ => None,
        }
    }
}

/// Events from the producer's watchdog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerEvent {
    /// The host requested a graceful stop; capture should end now
    StopRequested,
}

/// Capture-process frame producer
pub struct FrameProducer {
    config: BroadcastConfig,
    mailbox: FrameMailbox,
    control: ControlBlock,
    stats: Arc<RelayStats>,
    event_tx: mpsc::Sender<ProducerEvent>,
    watchdog: Option<Watchdog>,
}

impl FrameProducer {
    /// Create a producer.
    ///
    /// Returns the producer and a receiver for watchdog events.
    pub fn new(config: BroadcastConfig) -> (Self, mpsc::Receiver<ProducerEvent>) {
        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let producer = Self {
            mailbox: FrameMailbox::from_config(&config),
            control: ControlBlock::from_config(&config),
            stats: Arc::new(RelayStats::new()),
            event_tx: tx,
            watchdog: None,
            config,
        };

        (producer, rx)
    }

    /// Shared relay counters
    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.stats
    }

    /// Begin a broadcast session.
    ///
    /// Clears the mailbox so a stale frame from a previous session can never
    /// leak into this one, then starts the stop-flag watchdog.
    pub fn start_broadcast(&mut self) {
        self.mailbox.clear();

        let watchdog = Watchdog::spawn(
            self.control.clone(),
            self.config.watchdog_period,
            self.config.heartbeat_staleness,
            self.event_tx.clone(),
        );
        self.watchdog = Some(watchdog);

        tracing::info!("Broadcast started, mailbox cleared");
    }

    /// End the broadcast session and stop the watchdog.
    pub fn finish_broadcast(&mut self) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.stop();
        }
        tracing::info!(stats = ?self.stats.snapshot(), "Broadcast finished");
    }

    /// Relay one captured sample.
    ///
    /// Video samples are serialized and overwrite the mailbox slot; audio
    /// samples are not relayed. An unrecognized category code is a contract
    /// violation and returns a fatal error.
    ///
    /// Call this from the capture framework's sample delivery queue: the
    /// mailbox write runs on the calling thread, which keeps it off the
    /// extension's lifecycle thread without an extra hop.
    pub fn handle_sample(
        &self,
        category_code: u32,
        buffer: &FrameBuffer,
        orientation: Orientation,
        timestamp_ns: i64,
    ) -> Result<()> {
        let category = SampleCategory::from_code(category_code)
            .ok_or(Error::UnsupportedSampleCategory(category_code))?;

        match category {
            SampleCategory::Video => {
                self.relay_video(buffer, orientation, timestamp_ns);
                Ok(())
            }
            SampleCategory::AppAudio | SampleCategory::MicAudio => Ok(()),
        }
    }

    fn relay_video(&self, buffer: &FrameBuffer, orientation: Orientation, timestamp_ns: i64) {
        if !buffer.pixel_format.is_single_plane() {
            tracing::debug!(format = %buffer.pixel_format, "Multi-planar sample dropped");
            self.stats.record_dropped();
            return;
        }

        if serialized_len(buffer.data.len()) > self.mailbox.capacity() {
            tracing::warn!(
                payload = buffer.data.len(),
                capacity = self.mailbox.capacity(),
                "Frame exceeds mailbox capacity, dropped"
            );
            self.stats.record_dropped();
            return;
        }

        let record = serialize(buffer, orientation, timestamp_ns);
        if self.mailbox.write(&record, 0) {
            self.stats.record_written();
        } else {
            self.stats.record_dropped();
        }
    }
}

impl Drop for FrameProducer {
    fn drop(&mut self) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::codec::{deserialize, PixelFormat};

    fn test_config(name: &str) -> BroadcastConfig {
        let dir = std::env::temp_dir().join(format!(
            "screenbridge-producer-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        BroadcastConfig::with_container(dir).mailbox_capacity(64 * 1024)
    }

    fn bgra_frame(len: usize) -> FrameBuffer {
        FrameBuffer::new(
            (len / 4) as u32,
            1,
            PixelFormat::BGRA,
            len as u32,
            Bytes::from(vec![0x11u8; len]),
        )
    }

    #[test]
    fn test_video_sample_lands_in_mailbox() {
        let config = test_config("video");
        let (producer, _events) = FrameProducer::new(config.clone());

        let frame = bgra_frame(64);
        producer.handle_sample(0, &frame, Orientation::LEFT, 77).unwrap();

        let mailbox = FrameMailbox::from_config(&config);
        let decoded = deserialize(&mailbox.read_record().unwrap()).unwrap();
        assert_eq!(decoded.header.timestamp_ns, 77);
        assert_eq!(decoded.buffer, frame);
        assert_eq!(producer.stats().snapshot().frames_written, 1);
    }

    #[test]
    fn test_audio_samples_not_relayed() {
        let config = test_config("audio");
        let (producer, _events) = FrameProducer::new(config.clone());

        let frame = bgra_frame(16);
        producer.handle_sample(1, &frame, Orientation::UP, 0).unwrap();
        producer.handle_sample(2, &frame, Orientation::UP, 0).unwrap();

        assert!(FrameMailbox::from_config(&config).is_clean());
        assert_eq!(producer.stats().snapshot().frames_written, 0);
    }

    #[test]
    fn test_unknown_category_is_fatal() {
        let config = test_config("category");
        let (producer, _events) = FrameProducer::new(config);

        let frame = bgra_frame(16);
        let err = producer.handle_sample(9, &frame, Orientation::UP, 0);
        assert!(matches!(err, Err(Error::UnsupportedSampleCategory(9))));
    }

    #[test]
    fn test_oversize_frame_dropped() {
        let config = test_config("oversize").mailbox_capacity(256);
        let (producer, _events) = FrameProducer::new(config.clone());

        let frame = bgra_frame(4096);
        producer.handle_sample(0, &frame, Orientation::UP, 0).unwrap();

        assert!(FrameMailbox::from_config(&config).is_clean());
        assert_eq!(producer.stats().snapshot().frames_dropped, 1);
    }

    #[test]
    fn test_multi_planar_dropped() {
        let config = test_config("planar");
        let (producer, _events) = FrameProducer::new(config.clone());

        let frame = FrameBuffer::new(4, 4, PixelFormat::YCBCR_420V, 16, Bytes::from(vec![0u8; 24]));
        producer.handle_sample(0, &frame, Orientation::UP, 0).unwrap();

        assert!(FrameMailbox::from_config(&config).is_clean());
        assert_eq!(producer.stats().snapshot().frames_dropped, 1);
    }

    #[tokio::test]
    async fn test_start_broadcast_discards_stale_frame() {
        let config = test_config("stale");
        let mailbox = FrameMailbox::from_config(&config);
        mailbox.write(b"BBBstale-from-last-session", 0);
        assert!(!mailbox.is_clean());

        let (mut producer, _events) = FrameProducer::new(config);
        producer.start_broadcast();
        assert!(mailbox.is_clean());
        producer.finish_broadcast();
    }
}
