//! SDP assembly and answer validation
//!
//! Only what the single outbound video track needs: an offer with one
//! sendonly video m-line, and a lenient structural check of the remote
//! answer. Full SDP parsing belongs to the media engine; this module keeps
//! just enough structure to negotiate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::SignalingError;

/// Media direction attribute on the remote answer's video section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDirection {
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

/// Structural summary of an accepted remote answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSummary {
    /// Direction declared on the video section (answerers default sendrecv)
    pub direction: MediaDirection,
    /// Remote ICE username fragment, when present
    pub ice_ufrag: Option<String>,
}

/// Build the local offer: one sendonly H264 video track.
///
/// `session_id` seeds the origin line so rebuilt sessions produce distinct
/// offers. ICE credentials are generated per offer.
pub fn build_offer(session_id: u64) -> String {
    let (ufrag, pwd) = ice_credentials();

    let mut sdp = String::with_capacity(512);
    sdp.push_str("v=0\r\n");
    sdp.push_str(&format!("o=- {} 2 IN IP4 127.0.0.1\r\n", origin_id(session_id)));
    sdp.push_str("s=-\r\n");
    sdp.push_str("t=0 0\r\n");
    sdp.push_str("a=group:BUNDLE 0\r\n");
    sdp.push_str("m=video 9 UDP/TLS/RTP/SAVPF 96\r\n");
    sdp.push_str("c=IN IP4 0.0.0.0\r\n");
    sdp.push_str(&format!("a=ice-ufrag:{}\r\n", ufrag));
    sdp.push_str(&format!("a=ice-pwd:{}\r\n", pwd));
    sdp.push_str("a=mid:0\r\n");
    sdp.push_str("a=sendonly\r\n");
    sdp.push_str("a=rtcp-mux\r\n");
    sdp.push_str("a=rtpmap:96 H264/90000\r\n");
    sdp.push_str("a=fmtp:96 level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42e01f\r\n");
    sdp
}

/// Validate a remote answer.
///
/// Accepts any description that is recognizably SDP and negotiates a video
/// section; everything else is left to the engine. Rejection reasons are
/// reported verbatim to the caller of `set_remote_answer` and nowhere else.
pub fn validate_answer(sdp: &str) -> Result<AnswerSummary, SignalingError> {
    let mut lines = sdp.lines().map(str::trim).filter(|l| !l.is_empty());

    match lines.next() {
        Some("v=0") => {}
        _ => {
            return Err(SignalingError::BadRemoteDescription(
                "missing v=0 version line".into(),
            ))
        }
    }

    let mut in_video = false;
    let mut has_video = false;
    let mut direction = MediaDirection::SendRecv;
    let mut ice_ufrag = None;

    for line in lines {
        if let Some(media) = line.strip_prefix("m=") {
            in_video = media.starts_with("video");
            has_video |= in_video;
            continue;
        }
        if !in_video {
            continue;
        }
        match line {
            "a=sendrecv" => direction = MediaDirection::SendRecv,
            "a=sendonly" => direction = MediaDirection::SendOnly,
            "a=recvonly" => direction = MediaDirection::RecvOnly,
            "a=inactive" => direction = MediaDirection::Inactive,
            _ => {
                if let Some(u) = line.strip_prefix("a=ice-ufrag:") {
                    ice_ufrag = Some(u.to_string());
                }
            }
        }
    }

    if !has_video {
        return Err(SignalingError::BadRemoteDescription(
            "answer has no video section".into(),
        ));
    }

    Ok(AnswerSummary {
        direction,
        ice_ufrag,
    })
}

/// Distinct origin session id per offer, even for rapid rebuilds
fn origin_id(session_id: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    now.wrapping_mul(1000).wrapping_add(session_id)
}

/// Generate a fresh (ufrag, pwd) pair.
///
/// Time-and-counter-seeded; uniqueness matters here, unpredictability is the
/// DTLS layer's job.
fn ice_credentials() -> (String, String) {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut state = now ^ SEQUENCE.fetch_add(1, Ordering::Relaxed).wrapping_mul(0x9E37_79B9_7F4A_7C15);

    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ALPHABET[((state >> 33) % ALPHABET.len() as u64) as usize] as char
    };

    let ufrag: String = (0..8).map(|_| next()).collect();
    let pwd: String = (0..24).map(|_| next()).collect();
    (ufrag, pwd)
}
