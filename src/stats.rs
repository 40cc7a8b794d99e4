//! Relay counters
//!
//! Best-effort counters shared across the producer, poller, and signaling
//! tasks. Relaxed ordering throughout; these feed logs, not control flow.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one process's side of the relay
#[derive(Debug, Default)]
pub struct RelayStats {
    /// Frames serialized and written into the mailbox
    frames_written: AtomicU64,
    /// Frames the producer dropped (oversize, unreachable mailbox, format)
    frames_dropped: AtomicU64,
    /// Records decoded successfully by the poller
    frames_decoded: AtomicU64,
    /// Records the poller discarded (torn, truncated, malformed)
    decode_failures: AtomicU64,
    /// Frames accepted by a connected session
    frames_pushed: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames_written: u64,
    pub frames_dropped: u64,
    pub frames_decoded: u64,
    pub decode_failures: u64,
    pub frames_pushed: u64,
}

impl RelayStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_written(&self) {
        self.frames_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decoded(&self) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pushed(&self) {
        self.frames_pushed.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy out the current values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_written: self.frames_written.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            frames_pushed: self.frames_pushed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = RelayStats::new();
        stats.record_written();
        stats.record_written();
        stats.record_dropped();
        stats.record_decoded();
        stats.record_decode_failure();
        stats.record_pushed();

        let snap = stats.snapshot();
        assert_eq!(snap.frames_written, 2);
        assert_eq!(snap.frames_dropped, 1);
        assert_eq!(snap.frames_decoded, 1);
        assert_eq!(snap.decode_failures, 1);
        assert_eq!(snap.frames_pushed, 1);
    }
}
