//! Host-side demo
//!
//! Plays the role of the host application: polls the shared mailbox, prints
//! lifecycle events, negotiates a session against a canned answer, and
//! reports relay counters on shutdown.
//!
//! Run with: cargo run --example host_side [CONTAINER_DIR]
//!
//! Pair it with the capture side in another terminal:
//!   cargo run --example host_side /tmp/screenbridge-demo
//!   cargo run --example capture_side /tmp/screenbridge-demo

use screenbridge::config::{BroadcastConfig, IceServerConfig};
use screenbridge::consumer::BroadcastEvent;
use screenbridge::service::BroadcastService;
use screenbridge::signaling::SignalingEvent;

/// Stand-in for the remote server's answer; in production this arrives
/// through the signaling transport.
const CANNED_ANSWER: &str =
    "v=0\r\no=- 1 2 IN IP4 0.0.0.0\r\ns=-\r\nt=0 0\r\n\
     m=video 9 UDP/TLS/RTP/SAVPF 96\r\na=recvonly\r\na=ice-ufrag:demo\r\n";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("screenbridge=debug".parse()?),
        )
        .init();

    let container = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/tmp/screenbridge-demo".into());

    let config = BroadcastConfig::with_container(container);
    let (mut service, mut events) = BroadcastService::new(config);

    service.initialize_broadcast();

    let offer = service.create_offer(&[IceServerConfig::stun("stun:stun.example.org:3478")])?;
    println!("Local offer:\n{}", offer);
    service.set_remote_answer(CANNED_ANSWER)?;

    println!("Host side: polling, Ctrl+C to stop the broadcast");

    loop {
        tokio::select! {
            event = events.broadcast.recv() => {
                match event {
                    Some(BroadcastEvent::Started) => println!("Broadcast started"),
                    Some(BroadcastEvent::Stopped) => println!("Broadcast stopped"),
                    None => break,
                }
            }
            event = events.signaling.recv() => {
                match event {
                    Some(SignalingEvent::LocalCandidate(json)) => {
                        println!("Local candidate for transport: {}", json);
                    }
                    Some(SignalingEvent::SessionReplaced { old_id, new_id }) => {
                        println!("Session {} replaced by {}", old_id, new_id);
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopping broadcast...");
                break;
            }
        }
    }

    service.stop_broadcast();
    println!("Relay stats: {:?}", service.client().stats().snapshot());
    Ok(())
}
