//! # screenbridge
//!
//! Cross-process screen-broadcast relay. A sandboxed capture process and a
//! host application process share nothing but a memory-mapped mailbox: the
//! producer overwrites the single slot with each captured frame, the host
//! polls it at ~30 Hz, infers broadcast lifecycle from content transitions,
//! and feeds decoded frames into a self-healing real-time media session.
//!
//! There are no cross-process locks anywhere. A mutex shared with a process
//! the platform can kill at any moment risks a permanent hang; a torn frame
//! caught by the record cookie is just one dropped frame at 30 Hz.
//!
//! Capture-process side:
//!
//! ```no_run
//! use screenbridge::codec::{FrameBuffer, Orientation, PixelFormat};
//! use screenbridge::config::BroadcastConfig;
//! use screenbridge::producer::FrameProducer;
//!
//! # async fn example(buffer: FrameBuffer) -> screenbridge::error::Result<()> {
//! let config = BroadcastConfig::with_container("/shared/container");
//! let (mut producer, mut events) = FrameProducer::new(config);
//!
//! producer.start_broadcast();
//! producer.handle_sample(0, &buffer, Orientation::UP, 123_456_789)?;
//!
//! // events.recv().await yields StopRequested when the host asks to end
//! # Ok(())
//! # }
//! ```
//!
//! Host-process side:
//!
//! ```no_run
//! use screenbridge::config::{BroadcastConfig, IceServerConfig};
//! use screenbridge::service::BroadcastService;
//!
//! # fn example() -> Result<(), screenbridge::error::SignalingError> {
//! let config = BroadcastConfig::with_container("/shared/container");
//! let (mut service, events) = BroadcastService::new(config);
//!
//! service.initialize_broadcast();
//! let offer = service.create_offer(&[IceServerConfig::stun("stun:stun.example.org:3478")])?;
//! // exchange offer/answer/candidates through your signaling transport...
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod consumer;
pub mod error;
pub mod mailbox;
pub mod producer;
pub mod service;
pub mod signaling;
pub mod stats;

pub use codec::{FrameBuffer, Orientation, PixelFormat, VideoRotation};
pub use config::{BroadcastConfig, IceServerConfig};
pub use consumer::{BroadcastEvent, FrameSink, MailboxPoller};
pub use error::{Error, Result};
pub use mailbox::{ControlBlock, FrameMailbox};
pub use producer::{FrameProducer, ProducerEvent};
pub use service::{BroadcastService, ServiceEvents};
pub use signaling::{IceCandidate, IceConnectionState, SignalingClient, SignalingEvent};
