//! Lifecycle control block
//!
//! A small fixed-layout mapped region beside the frame mailbox carrying the
//! cross-process lifecycle signals: the stop-request flag (host → capture)
//! and the host heartbeat timestamp (host liveness, read by the capture
//! watchdog). Same open-copy-flush-release discipline as the mailbox, same
//! miss-tolerant failure policy.
//!
//! ```text
//! +-------+------+---------+----------------+
//! | magic | stop | padding |   heartbeat    |
//! | 4 B   | 1 B  |  3 B    | f64 epoch secs |
//! +-------+------+---------+----------------+
//! ```

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::BroadcastConfig;
use crate::mailbox::region::Region;

const MAGIC: u32 = 0x5342_4342; // "SBCB"
const BLOCK_SIZE: usize = 16;

const STOP_OFFSET: usize = 4;
const HEARTBEAT_OFFSET: usize = 8;

/// Shared lifecycle control block
#[derive(Debug, Clone)]
pub struct ControlBlock {
    region: Region,
}

impl ControlBlock {
    /// Create a control block over the given backing path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            region: Region::new(path, BLOCK_SIZE),
        }
    }

    /// Create a control block at the configured container location
    pub fn from_config(config: &BroadcastConfig) -> Self {
        Self::new(config.control_path())
    }

    /// Request graceful capture termination (host side)
    pub fn request_stop(&self) {
        self.write_flag(true);
    }

    /// Clear the stop request (capture side, after honoring it)
    pub fn clear_stop(&self) {
        self.write_flag(false);
    }

    /// Whether a stop has been requested
    ///
    /// An unreachable control block reads as "not requested"; the watchdog
    /// simply checks again next tick.
    pub fn is_stop_requested(&self) -> bool {
        match self.region.read(1, STOP_OFFSET) {
            Ok(b) => b[0] != 0,
            Err(e) => {
                tracing::debug!(error = %e, "Stop flag unreadable, assuming not requested");
                false
            }
        }
    }

    /// Write the host liveness timestamp (Unix epoch seconds)
    pub fn write_heartbeat(&self, epoch_secs: f64) {
        let mut block = [0u8; BLOCK_SIZE - HEARTBEAT_OFFSET];
        block.copy_from_slice(&epoch_secs.to_ne_bytes());
        if self.region.write(&block, HEARTBEAT_OFFSET).is_err() {
            tracing::debug!("Heartbeat write skipped");
            return;
        }
        // Stamp the magic so readers can tell a live block from a fresh file
        let _ = self.region.write(&MAGIC.to_ne_bytes(), 0);
    }

    /// Read the last host liveness timestamp
    ///
    /// `None` until the host has written at least once, or when the block
    /// is unreachable.
    pub fn read_heartbeat(&self) -> Option<f64> {
        let magic = self.region.read(4, 0).ok()?;
        if u32::from_ne_bytes(magic.try_into().expect("magic is 4 bytes")) != MAGIC {
            return None;
        }

        let raw = self.region.read(8, HEARTBEAT_OFFSET).ok()?;
        let secs = f64::from_ne_bytes(raw.try_into().expect("heartbeat is 8 bytes"));
        secs.is_finite().then_some(secs)
    }

    /// Age of the last heartbeat relative to `now_epoch_secs`
    pub fn heartbeat_age(&self, now_epoch_secs: f64) -> Option<Duration> {
        let last = self.read_heartbeat()?;
        let age = now_epoch_secs - last;
        (age >= 0.0).then(|| Duration::from_secs_f64(age))
    }

    fn write_flag(&self, value: bool) {
        if self.region.write(&[value as u8], STOP_OFFSET).is_err() {
            tracing::debug!("Stop flag write skipped");
            return;
        }
        let _ = self.region.write(&MAGIC.to_ne_bytes(), 0);
    }
}

/// Current wall-clock time as Unix epoch seconds
pub fn now_epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
