//! ICE value types
//!
//! Candidates are plain value objects exchanged as serialized text with the
//! remote collaborator; they carry no ownership semantics. The JSON field
//! names follow the conventional candidate-record shape so the external
//! transport can pass them through untouched.

use serde::{Deserialize, Serialize};

use crate::error::SignalingError;

/// A single ICE candidate record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    /// The candidate line ("candidate:... typ host ...")
    pub candidate: String,

    /// Index of the media line this candidate belongs to
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_mline_index: u32,

    /// Media stream identification tag
    #[serde(rename = "sdpMid")]
    pub sdp_mid: String,
}

impl IceCandidate {
    /// Create a candidate record
    pub fn new(candidate: impl Into<String>, sdp_mline_index: u32, sdp_mid: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mline_index,
            sdp_mid: sdp_mid.into(),
        }
    }

    /// Serialize to the transport-neutral textual form
    pub fn to_json(&self) -> String {
        // A struct of strings and an integer cannot fail to serialize
        serde_json::to_string(self).expect("candidate serialization")
    }

    /// Parse the transport-neutral textual form
    pub fn from_json(text: &str) -> Result<Self, SignalingError> {
        serde_json::from_str(text).map_err(|e| SignalingError::BadCandidate(e.to_string()))
    }

    /// Minimal structural check before handing to the engine
    pub fn validate(&self) -> Result<(), SignalingError> {
        if self.candidate.trim().is_empty() {
            return Err(SignalingError::BadCandidate("empty candidate line".into()));
        }
        Ok(())
    }
}

/// ICE connection state reported by the media engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

impl IceConnectionState {
    /// States that require tearing the session down and rebuilding
    pub fn requires_rebuild(&self) -> bool {
        matches!(
            self,
            IceConnectionState::Disconnected
                | IceConnectionState::Failed
                | IceConnectionState::Closed
        )
    }
}

impl std::fmt::Display for IceConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IceConnectionState::New => "new",
            IceConnectionState::Checking => "checking",
            IceConnectionState::Connected => "connected",
            IceConnectionState::Completed => "completed",
            IceConnectionState::Disconnected => "disconnected",
            IceConnectionState::Failed => "failed",
            IceConnectionState::Closed => "closed",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let candidate = IceCandidate::new(
            "candidate:1 1 udp 2122260223 192.0.2.1 54321 typ host",
            0,
            "0",
        );
        let json = candidate.to_json();
        assert!(json.contains("\"sdpMLineIndex\":0"));
        assert!(json.contains("\"sdpMid\":\"0\""));

        let parsed = IceCandidate::from_json(&json).unwrap();
        assert_eq!(parsed, candidate);
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(matches!(
            IceCandidate::from_json("not json"),
            Err(SignalingError::BadCandidate(_))
        ));
        assert!(matches!(
            IceCandidate::from_json("{\"candidate\":1}"),
            Err(SignalingError::BadCandidate(_))
        ));
    }

    #[test]
    fn test_validate_empty_candidate() {
        let empty = IceCandidate::new("   ", 0, "0");
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_rebuild_states() {
        assert!(IceConnectionState::Disconnected.requires_rebuild());
        assert!(IceConnectionState::Failed.requires_rebuild());
        assert!(IceConnectionState::Closed.requires_rebuild());

        assert!(!IceConnectionState::New.requires_rebuild());
        assert!(!IceConnectionState::Checking.requires_rebuild());
        assert!(!IceConnectionState::Connected.requires_rebuild());
        assert!(!IceConnectionState::Completed.requires_rebuild());
    }
}
