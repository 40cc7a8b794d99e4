//! Host-process side
//!
//! The poller reads the mailbox at a fixed cadence, infers broadcast
//! lifecycle from content transitions, and forwards decoded frames.

pub mod poller;

pub use poller::{BroadcastEvent, FrameSink, MailboxPoller};
