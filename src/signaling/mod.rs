//! Real-time media signaling
//!
//! One session, one outbound video track, rebuilt wholesale on failure.
//! This module produces and consumes SDP strings and ICE candidate records;
//! moving them across the network belongs to the external transport
//! collaborator.

pub mod client;
pub mod ice;
pub mod sdp;
pub mod session;
pub mod supervisor;

pub use client::{SignalingClient, SignalingEvent};
pub use ice::{IceCandidate, IceConnectionState};
pub use sdp::{AnswerSummary, MediaDirection};
pub use session::{MediaSession, OutputFormat, SessionPhase, VideoTrack};
pub use supervisor::ConnectionSupervisor;
