//! Video frame types
//!
//! A captured frame is described by its geometry (width, height, stride),
//! a 32-bit FourCC-style pixel format code, and a raw payload. Orientation
//! travels beside the frame as a discrete platform code.

use bytes::Bytes;

/// 32-bit pixel format code (FourCC-style)
///
/// The code is carried verbatim through the mailbox; only a small set is
/// recognized by name. Multi-planar formats are identified so the producer
/// can refuse them (single-plane payloads only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat(pub u32);

impl PixelFormat {
    /// 32-bit BGRA, single plane
    pub const BGRA: PixelFormat = PixelFormat(0x4247_5241);
    /// Bi-planar 4:2:0 YCbCr, video range
    pub const YCBCR_420V: PixelFormat = PixelFormat(0x3432_3076);
    /// Bi-planar 4:2:0 YCbCr, full range
    pub const YCBCR_420F: PixelFormat = PixelFormat(0x3432_3066);

    /// Raw format code
    pub fn code(&self) -> u32 {
        self.0
    }

    /// Whether the payload occupies a single plane
    pub fn is_single_plane(&self) -> bool {
        !matches!(*self, PixelFormat::YCBCR_420V | PixelFormat::YCBCR_420F)
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b = self.0.to_be_bytes();
        if b.iter().all(|c| c.is_ascii_graphic()) {
            write!(
                f,
                "{}{}{}{}",
                b[0] as char, b[1] as char, b[2] as char, b[3] as char
            )
        } else {
            write!(f, "{:#010x}", self.0)
        }
    }
}

/// Discrete rotation applied by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoRotation {
    Deg0 = 0,
    Deg90 = 90,
    Deg270 = 270,
}

/// Platform orientation code attached to a captured sample
///
/// Codes follow the capture framework's numbering. Unrecognized codes pass
/// through the wire format untouched and render unrotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation(pub u32);

impl Orientation {
    pub const UP: Orientation = Orientation(1);
    pub const DOWN: Orientation = Orientation(3);
    pub const RIGHT: Orientation = Orientation(6);
    pub const LEFT: Orientation = Orientation(8);

    /// Build from a raw wire code
    pub fn from_code(code: u32) -> Self {
        Orientation(code)
    }

    /// Raw wire code
    pub fn code(&self) -> u32 {
        self.0
    }

    /// Rotation to apply when rendering
    ///
    /// Only landscape-left and landscape-right map to a turn; every other
    /// code, including mirrored variants, renders unrotated.
    pub fn rotation(&self) -> VideoRotation {
        match *self {
            Orientation::LEFT => VideoRotation::Deg90,
            Orientation::RIGHT => VideoRotation::Deg270,
            _ => VideoRotation::Deg0,
        }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::UP
    }
}

/// A single-plane video frame
///
/// Cheap to clone: the payload is reference counted via `Bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format code
    pub pixel_format: PixelFormat,
    /// Stride in bytes
    pub bytes_per_row: u32,
    /// Raw pixel payload
    pub data: Bytes,
}

impl FrameBuffer {
    /// Create a frame buffer from raw parts
    pub fn new(
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        bytes_per_row: u32,
        data: Bytes,
    ) -> Self {
        Self {
            width,
            height,
            pixel_format,
            bytes_per_row,
            data,
        }
    }

    /// Payload size in bytes
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Geometry sanity check used on both sides of the wire
    pub fn has_valid_geometry(&self) -> bool {
        self.width > 0 && self.height > 0 && self.bytes_per_row > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_format_planes() {
        assert!(PixelFormat::BGRA.is_single_plane());
        assert!(!PixelFormat::YCBCR_420V.is_single_plane());
        assert!(!PixelFormat::YCBCR_420F.is_single_plane());
        assert!(PixelFormat(0x1234_5678).is_single_plane());
    }

    #[test]
    fn test_pixel_format_display() {
        assert_eq!(PixelFormat::BGRA.to_string(), "BGRA");
        assert_eq!(PixelFormat(3).to_string(), "0x00000003");
    }

    #[test]
    fn test_rotation_mapping() {
        assert_eq!(Orientation::LEFT.rotation(), VideoRotation::Deg90);
        assert_eq!(Orientation::RIGHT.rotation(), VideoRotation::Deg270);
        assert_eq!(Orientation::UP.rotation(), VideoRotation::Deg0);
        assert_eq!(Orientation::DOWN.rotation(), VideoRotation::Deg0);
        // Mirrored and unknown codes render unrotated
        assert_eq!(Orientation(5).rotation(), VideoRotation::Deg0);
        assert_eq!(Orientation(42).rotation(), VideoRotation::Deg0);
    }

    #[test]
    fn test_orientation_code_round_trip() {
        for code in [0u32, 1, 6, 8, 999] {
            assert_eq!(Orientation::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_frame_buffer_geometry() {
        let frame = FrameBuffer::new(2, 2, PixelFormat::BGRA, 8, Bytes::from(vec![0u8; 16]));
        assert!(frame.has_valid_geometry());
        assert_eq!(frame.data_size(), 16);

        let degenerate = FrameBuffer::new(0, 2, PixelFormat::BGRA, 8, Bytes::new());
        assert!(!degenerate.has_valid_geometry());
    }
}
