//! Shared-memory mailbox
//!
//! Cross-process frame passing with no locks and no semaphores: a fixed
//! 20 MiB single-slot region holding the most recent serialized frame, plus
//! a small control block for lifecycle signals. Torn transfers are detected
//! by the frame record cookie, one layer up.

pub mod control;
pub mod frame_mailbox;
pub(crate) mod region;

pub use control::{now_epoch_secs, ControlBlock};
pub use frame_mailbox::FrameMailbox;
