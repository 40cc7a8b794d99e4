//! Media session state machine
//!
//! One session per broadcast attempt: exactly one outbound video track, no
//! inbound media. A session is created once, negotiated, and on any
//! qualifying failure torn down and replaced wholesale by the supervisor,
//! never resumed in place.

use crate::codec::{FrameBuffer, Orientation, VideoRotation};
use crate::config::IceServerConfig;
use crate::error::SignalingError;

use super::ice::IceCandidate;
use super::sdp::{self, AnswerSummary};

/// Nominal output frame rate latched with the first frame
const NOMINAL_FPS: u32 = 30;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created, no local description yet
    New,
    /// Local offer created and set
    Offering,
    /// Latched connected; frames are accepted
    Connected,
    /// ICE reported a drop; awaiting replacement
    Disconnected,
    /// ICE reported failure; awaiting replacement
    Failed,
    /// Torn down
    Closed,
}

/// Output format latched on the first accepted frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// The session's single outbound video track
#[derive(Debug, Default)]
pub struct VideoTrack {
    /// Format latched by the first accepted frame, then never renegotiated
    format: Option<OutputFormat>,
    /// Rotation of the most recent frame
    last_rotation: Option<VideoRotation>,
    /// Frames accepted into the track
    frames_ingested: u64,
}

impl VideoTrack {
    /// Latched output format, if any frame has been accepted
    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }

    /// Rotation carried by the most recent frame
    pub fn last_rotation(&self) -> Option<VideoRotation> {
        self.last_rotation
    }

    /// Frames accepted so far
    pub fn frames_ingested(&self) -> u64 {
        self.frames_ingested
    }

    fn ingest(&mut self, buffer: &FrameBuffer, rotation: VideoRotation) {
        if self.format.is_none() {
            let format = OutputFormat {
                width: buffer.width,
                height: buffer.height,
                fps: NOMINAL_FPS,
            };
            tracing::info!(
                width = format.width,
                height = format.height,
                fps = format.fps,
                "Output format latched"
            );
            self.format = Some(format);
        }
        self.last_rotation = Some(rotation);
        self.frames_ingested += 1;
    }
}

/// One negotiated real-time media session
#[derive(Debug)]
pub struct MediaSession {
    /// Session id, unique per process lifetime
    id: u64,
    phase: SessionPhase,
    /// Whether any signaling-state change has been observed yet
    signaling_changed: bool,
    local_sdp: Option<String>,
    remote_answer: Option<AnswerSummary>,
    remote_candidates: Vec<IceCandidate>,
    track: VideoTrack,
}

impl MediaSession {
    /// Create a fresh session
    pub fn new(id: u64) -> Self {
        Self {
            id,
            phase: SessionPhase::New,
            signaling_changed: false,
            local_sdp: None,
            remote_answer: None,
            remote_candidates: Vec::new(),
            track: VideoTrack::default(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn track(&self) -> &VideoTrack {
        &self.track
    }

    /// The local description, once an offer has been created
    pub fn local_description(&self) -> Option<&str> {
        self.local_sdp.as_deref()
    }

    /// Summary of the applied remote answer, if any
    pub fn remote_answer(&self) -> Option<&AnswerSummary> {
        self.remote_answer.as_ref()
    }

    pub fn remote_candidates(&self) -> &[IceCandidate] {
        &self.remote_candidates
    }

    /// Create and set the local offer, returning its textual form.
    ///
    /// Fails if negotiation cannot proceed: no usable ICE server configured,
    /// or the session already left the `New` phase.
    pub fn create_offer(&mut self, ice_servers: &[IceServerConfig]) -> Result<String, SignalingError> {
        if self.phase != SessionPhase::New {
            return Err(SignalingError::InvalidPhase("create_offer"));
        }
        if !ice_servers.iter().any(IceServerConfig::is_usable) {
            return Err(SignalingError::NoIceServers);
        }

        let offer = sdp::build_offer(self.id);
        self.local_sdp = Some(offer.clone());
        self.phase = SessionPhase::Offering;
        tracing::info!(session = self.id, "Local offer set");
        Ok(offer)
    }

    /// Apply the remote answer.
    ///
    /// A rejected answer affects only this call; the session keeps its
    /// current phase and frame pushing simply stays inert.
    pub fn set_remote_answer(&mut self, answer_sdp: &str) -> Result<(), SignalingError> {
        if self.phase == SessionPhase::Closed {
            return Err(SignalingError::SessionClosed);
        }

        let summary = sdp::validate_answer(answer_sdp)?;
        tracing::info!(session = self.id, direction = ?summary.direction, "Remote answer applied");
        self.remote_answer = Some(summary);
        Ok(())
    }

    /// Apply one remote ICE candidate.
    ///
    /// Candidates are applied individually: one bad candidate does not
    /// affect others already queued or applied.
    pub fn add_remote_candidate(&mut self, candidate: IceCandidate) -> Result<(), SignalingError> {
        if self.phase == SessionPhase::Closed {
            return Err(SignalingError::SessionClosed);
        }

        candidate.validate()?;
        tracing::debug!(session = self.id, mid = %candidate.sdp_mid, "Remote candidate added");
        self.remote_candidates.push(candidate);
        Ok(())
    }

    /// Record a signaling-state change.
    ///
    /// The first observed change latches the session Connected. This is
    /// deliberately optimistic: it can fire before ICE reports
    /// connectivity, and the supervisor corrects course on any qualifying
    /// ICE failure.
    pub fn on_signaling_state_change(&mut self) {
        if self.signaling_changed {
            return;
        }
        self.signaling_changed = true;

        if matches!(self.phase, SessionPhase::New | SessionPhase::Offering) {
            self.phase = SessionPhase::Connected;
            tracing::info!(session = self.id, "Session latched connected");
        }
    }

    /// Mark the session dropped after a qualifying ICE transition.
    pub fn mark_dropped(&mut self, phase: SessionPhase) {
        debug_assert!(matches!(
            phase,
            SessionPhase::Disconnected | SessionPhase::Failed | SessionPhase::Closed
        ));
        self.phase = phase;
    }

    /// Ingest one frame into the outbound track.
    ///
    /// No-op unless Connected. The first accepted frame latches the output
    /// format for the rest of the session's life. Returns whether the frame
    /// was accepted.
    pub fn push_frame(
        &mut self,
        _timestamp_ns: i64,
        orientation: Orientation,
        buffer: &FrameBuffer,
    ) -> bool {
        if self.phase != SessionPhase::Connected {
            return false;
        }

        self.track.ingest(buffer, orientation.rotation());
        true
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::codec::PixelFormat;

    fn stun() -> Vec<IceServerConfig> {
        vec![IceServerConfig::stun("stun:stun.example.org:3478")]
    }

    fn frame(width: u32, height: u32) -> FrameBuffer {
        FrameBuffer::new(
            width,
            height,
            PixelFormat::BGRA,
            width * 4,
            Bytes::from(vec![0u8; (width * height * 4) as usize]),
        )
    }

    #[test]
    fn test_offer_transitions_to_offering() {
        let mut session = MediaSession::new(1);
        assert_eq!(session.phase(), SessionPhase::New);

        let offer = session.create_offer(&stun()).unwrap();
        assert!(offer.contains("m=video"));
        assert_eq!(session.phase(), SessionPhase::Offering);
        assert_eq!(session.local_description(), Some(offer.as_str()));

        // A second offer on the same session is refused
        assert!(matches!(
            session.create_offer(&stun()),
            Err(SignalingError::InvalidPhase(_))
        ));
    }

    #[test]
    fn test_offer_requires_ice_servers() {
        let mut session = MediaSession::new(1);
        assert!(matches!(
            session.create_offer(&[]),
            Err(SignalingError::NoIceServers)
        ));
        // Failure leaves the session usable
        assert_eq!(session.phase(), SessionPhase::New);
        assert!(session.create_offer(&stun()).is_ok());
    }

    #[test]
    fn test_frames_dropped_until_connected() {
        let mut session = MediaSession::new(1);
        session.create_offer(&stun()).unwrap();

        assert!(!session.push_frame(0, Orientation::UP, &frame(4, 4)));
        assert_eq!(session.track().frames_ingested(), 0);

        session.on_signaling_state_change();
        assert_eq!(session.phase(), SessionPhase::Connected);
        assert!(session.push_frame(1, Orientation::UP, &frame(4, 4)));
        assert_eq!(session.track().frames_ingested(), 1);
    }

    #[test]
    fn test_format_latched_on_first_frame_only() {
        let mut session = MediaSession::new(1);
        session.create_offer(&stun()).unwrap();
        session.on_signaling_state_change();

        session.push_frame(0, Orientation::UP, &frame(640, 480));
        let latched = session.track().format().unwrap();
        assert_eq!((latched.width, latched.height), (640, 480));

        // Later frames with different geometry do not renegotiate
        session.push_frame(1, Orientation::UP, &frame(1920, 1080));
        let still = session.track().format().unwrap();
        assert_eq!((still.width, still.height), (640, 480));
    }

    #[test]
    fn test_rotation_tracked_per_frame() {
        let mut session = MediaSession::new(1);
        session.create_offer(&stun()).unwrap();
        session.on_signaling_state_change();

        session.push_frame(0, Orientation::LEFT, &frame(4, 4));
        assert_eq!(session.track().last_rotation(), Some(VideoRotation::Deg90));

        session.push_frame(1, Orientation::from_code(99), &frame(4, 4));
        assert_eq!(session.track().last_rotation(), Some(VideoRotation::Deg0));
    }

    #[test]
    fn test_second_signaling_change_is_inert() {
        let mut session = MediaSession::new(1);
        session.create_offer(&stun()).unwrap();
        session.on_signaling_state_change();
        session.mark_dropped(SessionPhase::Disconnected);

        // A late signaling callback must not resurrect a dropped session
        session.on_signaling_state_change();
        assert_eq!(session.phase(), SessionPhase::Disconnected);
    }

    #[test]
    fn test_bad_answer_does_not_poison_session() {
        let mut session = MediaSession::new(1);
        session.create_offer(&stun()).unwrap();

        assert!(session.set_remote_answer("garbage").is_err());
        assert_eq!(session.phase(), SessionPhase::Offering);

        let answer = "v=0\r\nm=video 9 UDP/TLS/RTP/SAVPF 96\r\na=recvonly\r\n";
        assert!(session.set_remote_answer(answer).is_ok());
        assert!(session.remote_answer().is_some());
    }

    #[test]
    fn test_candidates_applied_individually() {
        let mut session = MediaSession::new(1);

        let good = IceCandidate::new("candidate:1 1 udp 1 192.0.2.1 1000 typ host", 0, "0");
        let bad = IceCandidate::new("", 0, "0");

        assert!(session.add_remote_candidate(good.clone()).is_ok());
        assert!(session.add_remote_candidate(bad).is_err());
        assert!(session.add_remote_candidate(good.clone()).is_ok());
        assert_eq!(session.remote_candidates().len(), 2);
    }

    #[test]
    fn test_closed_session_refuses_operations() {
        let mut session = MediaSession::new(1);
        session.mark_dropped(SessionPhase::Closed);

        assert!(matches!(
            session.set_remote_answer("v=0\r\nm=video 0 x 0\r\n"),
            Err(SignalingError::SessionClosed)
        ));
        assert!(matches!(
            session.add_remote_candidate(IceCandidate::new("c", 0, "0")),
            Err(SignalingError::SessionClosed)
        ));
        assert!(!session.push_frame(0, Orientation::UP, &frame(4, 4)));
    }
}
