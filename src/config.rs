//! Broadcast configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default mailbox capacity (20 MiB), enough for a single BGRA frame at
/// 2048x2048 plus the record envelope.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 20 * 1024 * 1024;

/// File name of the frame mailbox inside the shared container
pub const FRAME_MAILBOX_FILE: &str = "currentFrame.mmap";

/// File name of the lifecycle control block inside the shared container
pub const CONTROL_FILE: &str = "control.mmap";

/// Configuration shared by both process roles
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Directory reachable by both processes (the shared container)
    pub container_dir: PathBuf,

    /// Mailbox capacity in bytes
    pub mailbox_capacity: usize,

    /// Consumer poll period (~30 Hz)
    pub poll_period: Duration,

    /// Producer watchdog period (stop-flag checks)
    pub watchdog_period: Duration,

    /// Host heartbeat write period
    pub heartbeat_period: Duration,

    /// Heartbeat age beyond which the host is considered stale
    pub heartbeat_staleness: Duration,

    /// Capacity of event channels handed to callers
    pub event_channel_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            container_dir: std::env::temp_dir().join("screenbridge"),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            poll_period: Duration::from_millis(33),
            watchdog_period: Duration::from_secs(1),
            heartbeat_period: Duration::from_secs(1),
            heartbeat_staleness: Duration::from_secs(5),
            event_channel_capacity: 256,
        }
    }
}

impl BroadcastConfig {
    /// Create a config rooted at the given shared container directory
    pub fn with_container(dir: impl Into<PathBuf>) -> Self {
        Self {
            container_dir: dir.into(),
            ..Default::default()
        }
    }

    /// Set the shared container directory
    pub fn container_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.container_dir = dir.into();
        self
    }

    /// Set the mailbox capacity in bytes
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Set the consumer poll period
    pub fn poll_period(mut self, period: Duration) -> Self {
        self.poll_period = period;
        self
    }

    /// Set the producer watchdog period
    pub fn watchdog_period(mut self, period: Duration) -> Self {
        self.watchdog_period = period;
        self
    }

    /// Set the host heartbeat write period
    pub fn heartbeat_period(mut self, period: Duration) -> Self {
        self.heartbeat_period = period;
        self
    }

    /// Set the heartbeat staleness threshold
    pub fn heartbeat_staleness(mut self, threshold: Duration) -> Self {
        self.heartbeat_staleness = threshold;
        self
    }

    /// Path of the frame mailbox file
    pub fn frame_mailbox_path(&self) -> PathBuf {
        self.container_dir.join(FRAME_MAILBOX_FILE)
    }

    /// Path of the lifecycle control file
    pub fn control_path(&self) -> PathBuf {
        self.container_dir.join(CONTROL_FILE)
    }
}

/// ICE server entry handed to `create_offer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceServerConfig {
    /// Server URLs ("stun:..." / "turn:...")
    pub urls: Vec<String>,

    /// TURN username, if required
    pub username: Option<String>,

    /// TURN credential, if required
    pub credential: Option<String>,
}

impl IceServerConfig {
    /// Create a STUN-only entry
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    /// Create a TURN entry with credentials
    pub fn turn(
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            urls: vec![url.into()],
            username: Some(username.into()),
            credential: Some(credential.into()),
        }
    }

    /// An entry is usable if it names at least one non-empty URL
    pub fn is_usable(&self) -> bool {
        self.urls.iter().any(|u| !u.trim().is_empty())
    }
}

/// Ensure the shared container directory exists
///
/// Best effort: failure is reported but callers may still proceed, since the
/// mailbox treats every open failure as "no data available".
pub fn ensure_container(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}
