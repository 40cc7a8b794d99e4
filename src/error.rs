//! Error types
//!
//! Three recoverable families (codec, mailbox, signaling) plus one fatal
//! contract violation. Codec and mailbox errors always mean "drop this frame
//! and try again next tick"; signaling errors are returned to the caller of
//! the specific operation that failed.

use std::fmt;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Frame record validation failures
///
/// Every variant classifies a distinct malformed shape so callers can count
/// drops by cause. None of these is fatal: a torn record is the designed
/// signal of a concurrent overwrite, not an exceptional condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Input does not begin with the record tag
    TagMissing,
    /// Input is shorter than tag + header
    HeaderTooShort,
    /// Header fields fail sanity checks (zero geometry, stride too small)
    InvalidHeader,
    /// Declared payload length exceeds the input
    SizeMismatch,
    /// Trailer cookie does not match the header cookie (torn read/write)
    CookieMismatch,
    /// Payload buffer allocation failed
    AllocationFailed,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::TagMissing => write!(f, "Frame tag missing"),
            CodecError::HeaderTooShort => write!(f, "Input shorter than frame header"),
            CodecError::InvalidHeader => write!(f, "Frame header failed validation"),
            CodecError::SizeMismatch => write!(f, "Declared payload size exceeds input"),
            CodecError::CookieMismatch => write!(f, "Trailer cookie mismatch (torn frame)"),
            CodecError::AllocationFailed => write!(f, "Payload allocation failed"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Mailbox backing-store failures
///
/// These never propagate past the mailbox API: every open/size/map failure
/// is reported to callers as "no data available" and retried on the next
/// cycle. The variants exist for logging.
#[derive(Debug)]
pub enum MailboxError {
    /// Backing file could not be opened or created
    Open(std::io::Error),
    /// Backing file could not be sized to capacity
    Resize(std::io::Error),
    /// Mapping the file into memory failed
    Map(std::io::Error),
    /// Requested range lies outside the mapped capacity
    OutOfRange { offset: usize, len: usize, capacity: usize },
}

impl fmt::Display for MailboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailboxError::Open(e) => write!(f, "Failed to open mailbox region: {}", e),
            MailboxError::Resize(e) => write!(f, "Failed to size mailbox region: {}", e),
            MailboxError::Map(e) => write!(f, "Failed to map mailbox region: {}", e),
            MailboxError::OutOfRange { offset, len, capacity } => write!(
                f,
                "Mailbox range out of bounds: offset={} len={} capacity={}",
                offset, len, capacity
            ),
        }
    }
}

impl std::error::Error for MailboxError {}

/// Media negotiation failures
///
/// Returned to the caller of the failing operation only; unrelated in-flight
/// operations are unaffected. The connection supervisor rebuilds the session
/// on qualifying ICE transitions, not on these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingError {
    /// No usable ICE server configured, negotiation cannot proceed
    NoIceServers,
    /// Offer requested in a phase that does not allow it
    InvalidPhase(&'static str),
    /// Remote description could not be parsed or lacks a video section
    BadRemoteDescription(String),
    /// Remote ICE candidate was malformed
    BadCandidate(String),
    /// The session has been closed and replaced
    SessionClosed,
}

impl fmt::Display for SignalingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalingError::NoIceServers => write!(f, "No ICE servers configured"),
            SignalingError::InvalidPhase(op) => {
                write!(f, "Operation not valid in current session phase: {}", op)
            }
            SignalingError::BadRemoteDescription(reason) => {
                write!(f, "Remote description rejected: {}", reason)
            }
            SignalingError::BadCandidate(reason) => {
                write!(f, "Remote ICE candidate rejected: {}", reason)
            }
            SignalingError::SessionClosed => write!(f, "Session is closed"),
        }
    }
}

impl std::error::Error for SignalingError {}

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Frame record validation failure
    Codec(CodecError),
    /// Mailbox backing-store failure
    Mailbox(MailboxError),
    /// Media negotiation failure
    Signaling(SignalingError),
    /// The platform capture framework delivered a sample category this crate
    /// does not recognize. Contract violation; callers should stop capture.
    UnsupportedSampleCategory(u32),
    /// I/O error outside the mailbox (demo plumbing, shutdown)
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Codec(e) => write!(f, "Codec error: {}", e),
            Error::Mailbox(e) => write!(f, "Mailbox error: {}", e),
            Error::Signaling(e) => write!(f, "Signaling error: {}", e),
            Error::UnsupportedSampleCategory(c) => {
                write!(f, "Unsupported sample buffer category: {}", c)
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Codec(e) => Some(e),
            Error::Mailbox(e) => Some(e),
            Error::Signaling(e) => Some(e),
            Error::UnsupportedSampleCategory(_) => None,
            Error::Io(e) => Some(e),
        }
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Error::Codec(e)
    }
}

impl From<MailboxError> for Error {
    fn from(e: MailboxError) -> Self {
        Error::Mailbox(e)
    }
}

impl From<SignalingError> for Error {
    fn from(e: SignalingError) -> Self {
        Error::Signaling(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_display() {
        assert_eq!(
            CodecError::CookieMismatch.to_string(),
            "Trailer cookie mismatch (torn frame)"
        );
        assert_eq!(CodecError::TagMissing.to_string(), "Frame tag missing");
    }

    #[test]
    fn test_error_source_chain() {
        let err = Error::from(CodecError::SizeMismatch);
        assert!(std::error::Error::source(&err).is_some());

        let err = Error::UnsupportedSampleCategory(7);
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_mailbox_out_of_range_display() {
        let err = MailboxError::OutOfRange {
            offset: 10,
            len: 100,
            capacity: 64,
        };
        let msg = err.to_string();
        assert!(msg.contains("offset=10"));
        assert!(msg.contains("capacity=64"));
    }
}
