//! Frame record wire codec
//!
//! A frame record is the self-describing unit stored in the shared mailbox.
//! Both processes run on the same machine, so header integers are
//! native-endian; the trailer cookie is always little-endian.
//!
//! ```text
//! +-----+----------------------------------------------+---------+---------+
//! | Tag |                   Header                     | Payload | Trailer |
//! |"BBB"| ts(8) w(4) h(4) fmt(4) stride(4)             |  N raw  | cookie  |
//! | 3 B | size(4) orient(4) cookie(4)      = 36 B      |  bytes  | 4 B LE  |
//! +-----+----------------------------------------------+---------+---------+
//! ```
//!
//! The cookie appears in both header and trailer. It is the sole integrity
//! mechanism protecting against the mailbox's lock-free concurrent access:
//! a mismatch is the expected signal of a torn read, not an exceptional
//! condition, and always means "drop this frame".

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::frame::{FrameBuffer, Orientation, PixelFormat};
use crate::error::CodecError;

/// Record tag; never all-zero, so a zero-filled mailbox reads as clean
pub const FRAME_TAG: &[u8; 3] = b"BBB";

/// Serialized header size in bytes
pub const HEADER_SIZE: usize = 36;

/// Trailer (cookie) size in bytes
pub const TRAILER_SIZE: usize = 4;

/// Byte offset of the payload within a record
pub const PAYLOAD_OFFSET: usize = FRAME_TAG.len() + HEADER_SIZE;

/// Frame record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Capture timestamp in nanoseconds
    pub timestamp_ns: i64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format code
    pub pixel_format: u32,
    /// Stride in bytes
    pub bytes_per_row: u32,
    /// Payload length in bytes
    pub data_size: u32,
    /// Orientation code
    pub orientation: u32,
    /// Per-record integrity cookie, duplicated in the trailer
    pub cookie: u32,
}

/// A successfully decoded frame record
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Reconstructed frame buffer
    pub buffer: FrameBuffer,
    /// Orientation carried beside the frame
    pub orientation: Orientation,
    /// The validated header
    pub header: FrameHeader,
}

/// Total serialized length for a payload of `payload_len` bytes
pub fn serialized_len(payload_len: usize) -> usize {
    FRAME_TAG.len() + HEADER_SIZE + payload_len + TRAILER_SIZE
}

/// Serialize a frame into its mailbox record form
///
/// Geometry is read from the buffer; the cookie is freshly generated per
/// record. Single-plane pixel formats only.
pub fn serialize(buffer: &FrameBuffer, orientation: Orientation, timestamp_ns: i64) -> Bytes {
    debug_assert!(
        buffer.pixel_format.is_single_plane(),
        "multi-planar formats are not supported"
    );

    let cookie = fresh_cookie();
    let mut out = BytesMut::with_capacity(serialized_len(buffer.data.len()));

    out.put_slice(FRAME_TAG);
    out.put_i64_ne(timestamp_ns);
    out.put_u32_ne(buffer.width);
    out.put_u32_ne(buffer.height);
    out.put_u32_ne(buffer.pixel_format.code());
    out.put_u32_ne(buffer.bytes_per_row);
    out.put_u32_ne(buffer.data.len() as u32);
    out.put_u32_ne(orientation.code());
    out.put_u32_ne(cookie);
    out.put_slice(&buffer.data);
    out.put_u32_le(cookie);

    out.freeze()
}

/// Deserialize a mailbox record
///
/// Validation order: tag, header length, header sanity, payload extent,
/// trailer cookie. Input may carry trailing bytes beyond the record (the
/// mailbox region is larger than most records); they are ignored.
///
/// Every error classification means "drop this frame and poll again";
/// none is fatal to the caller's loop.
pub fn deserialize(input: &[u8]) -> Result<DecodedFrame, CodecError> {
    if input.len() < FRAME_TAG.len() || &input[..FRAME_TAG.len()] != FRAME_TAG {
        return Err(CodecError::TagMissing);
    }

    if input.len() < PAYLOAD_OFFSET {
        return Err(CodecError::HeaderTooShort);
    }

    let mut cursor = &input[FRAME_TAG.len()..PAYLOAD_OFFSET];
    let header = FrameHeader {
        timestamp_ns: cursor.get_i64_ne(),
        width: cursor.get_u32_ne(),
        height: cursor.get_u32_ne(),
        pixel_format: cursor.get_u32_ne(),
        bytes_per_row: cursor.get_u32_ne(),
        data_size: cursor.get_u32_ne(),
        orientation: cursor.get_u32_ne(),
        cookie: cursor.get_u32_ne(),
    };

    if header.width == 0 || header.height == 0 || header.bytes_per_row == 0 {
        return Err(CodecError::InvalidHeader);
    }

    let data_size = header.data_size as usize;
    let record_len = serialized_len(data_size);
    if record_len > input.len() {
        return Err(CodecError::SizeMismatch);
    }

    let trailer_offset = PAYLOAD_OFFSET + data_size;
    let trailer = u32::from_le_bytes(
        input[trailer_offset..trailer_offset + TRAILER_SIZE]
            .try_into()
            .expect("trailer slice is 4 bytes"),
    );
    if trailer != header.cookie {
        return Err(CodecError::CookieMismatch);
    }

    let mut payload = Vec::new();
    payload
        .try_reserve_exact(data_size)
        .map_err(|_| CodecError::AllocationFailed)?;
    payload.extend_from_slice(&input[PAYLOAD_OFFSET..trailer_offset]);

    let buffer = FrameBuffer::new(
        header.width,
        header.height,
        PixelFormat(header.pixel_format),
        header.bytes_per_row,
        Bytes::from(payload),
    );

    Ok(DecodedFrame {
        buffer,
        orientation: Orientation::from_code(header.orientation),
        header,
    })
}

/// Generate a per-record cookie
///
/// Time-seeded LCG mixed with a process-local counter. Not cryptographically
/// secure; the cookie detects torn reads, not adversaries.
fn fresh_cookie() -> u32 {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let mut state = now ^ seq.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    ((state >> 32) ^ state) as u32
}
