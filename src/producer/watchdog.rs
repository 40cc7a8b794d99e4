//! Producer watchdog
//!
//! A 1 Hz task in the capture process that polls the shared stop flag and
//! the host heartbeat. The stop flag is the single authoritative shutdown
//! signal; a stale heartbeat is logged for diagnostics only and never
//! forces termination on its own.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::mailbox::{now_epoch_secs, ControlBlock};

use super::producer::ProducerEvent;

/// Handle to the running watchdog task
#[derive(Debug)]
pub struct Watchdog {
    handle: JoinHandle<()>,
}

impl Watchdog {
    /// Spawn the watchdog loop.
    ///
    /// The task runs until a stop request is observed (the flag is cleared
    /// and `ProducerEvent::StopRequested` is emitted) or until `stop` aborts
    /// it.
    pub fn spawn(
        control: ControlBlock,
        period: Duration,
        heartbeat_staleness: Duration,
        event_tx: mpsc::Sender<ProducerEvent>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;

                if control.is_stop_requested() {
                    tracing::info!("Stop requested by host, ending capture");
                    control.clear_stop();
                    let _ = event_tx.send(ProducerEvent::StopRequested).await;
                    break;
                }

                match control.heartbeat_age(now_epoch_secs()) {
                    Some(age) if age > heartbeat_staleness => {
                        tracing::warn!(
                            age_secs = age.as_secs_f64(),
                            threshold_secs = heartbeat_staleness.as_secs_f64(),
                            "Host heartbeat is stale"
                        );
                    }
                    Some(_) => {}
                    None => {
                        tracing::debug!("No host heartbeat yet");
                    }
                }
            }
        });

        Self { handle }
    }

    /// Cancel the watchdog task.
    pub fn stop(self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_control(name: &str) -> ControlBlock {
        let path = std::env::temp_dir().join(format!(
            "screenbridge-watchdog-{}-{}.mmap",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        ControlBlock::new(path)
    }

    #[tokio::test]
    async fn test_stop_flag_triggers_event_and_clears() {
        let control = temp_control("stop");
        let (tx, mut rx) = mpsc::channel(8);

        let _watchdog = Watchdog::spawn(
            control.clone(),
            Duration::from_millis(10),
            Duration::from_secs(5),
            tx,
        );

        control.request_stop();

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("watchdog should observe the flag")
            .expect("channel open");
        assert_eq!(event, ProducerEvent::StopRequested);
        assert!(!control.is_stop_requested());
    }

    #[tokio::test]
    async fn test_no_event_without_stop_request() {
        let control = temp_control("idle");
        let (tx, mut rx) = mpsc::channel(8);

        let watchdog = Watchdog::spawn(
            control,
            Duration::from_millis(10),
            Duration::from_secs(5),
            tx,
        );

        let outcome = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(outcome.is_err(), "no event expected while flag is unset");
        watchdog.stop();
    }
}
