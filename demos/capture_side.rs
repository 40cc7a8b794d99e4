//! Capture-side demo
//!
//! Plays the role of the sandboxed capture process: writes synthetic video
//! frames into the shared mailbox at ~30 Hz until the host requests a stop.
//!
//! Run with: cargo run --example capture_side [CONTAINER_DIR]
//!
//! Pair it with the host side in another terminal:
//!   cargo run --example host_side /tmp/screenbridge-demo
//!   cargo run --example capture_side /tmp/screenbridge-demo

use std::time::Duration;

use bytes::Bytes;

use screenbridge::codec::{FrameBuffer, Orientation, PixelFormat};
use screenbridge::config::BroadcastConfig;
use screenbridge::producer::{FrameProducer, ProducerEvent};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 180;

/// Synthesize a BGRA frame with a moving gradient so successive frames differ
fn synthetic_frame(tick: u64) -> FrameBuffer {
    let stride = WIDTH * 4;
    let mut data = vec![0u8; (stride * HEIGHT) as usize];

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let i = ((y * stride) + x * 4) as usize;
            data[i] = (x as u64 + tick) as u8; // B
            data[i + 1] = (y as u64 + tick) as u8; // G
            data[i + 2] = tick as u8; // R
            data[i + 3] = 0xFF; // A
        }
    }

    FrameBuffer::new(WIDTH, HEIGHT, PixelFormat::BGRA, stride, Bytes::from(data))
}

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
    std::fs::create_dir_all(&container)?;

    let config = BroadcastConfig::with_container(container);
    let (mut producer, mut events) = FrameProducer::new(config);

    println!("Capture side: writing frames, waiting for host stop request");
    producer.start_broadcast();

    let start = std::time::Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_millis(33));
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let frame = synthetic_frame(tick);
                let timestamp_ns = start.elapsed().as_nanos() as i64;
                producer.handle_sample(0, &frame, Orientation::UP, timestamp_ns)?;
                tick += 1;
            }
            event = events.recv() => {
                if matches!(event, Some(ProducerEvent::StopRequested) | None) {
                    println!("Host requested stop after {} frames", tick);
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nInterrupted after {} frames", tick);
                break;
            }
        }
    }

    producer.finish_broadcast();
    Ok(())
}
