//! Capture-process side
//!
//! The frame producer serializes captured samples into the mailbox and
//! watches the shared stop flag for the host's shutdown request.

pub mod producer;
pub mod watchdog;

pub use producer::{FrameProducer, ProducerEvent, SampleCategory};
pub use watchdog::Watchdog;
