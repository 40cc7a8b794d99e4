//! Frame codec
//!
//! Converts raw video buffers to and from the self-describing byte records
//! stored in the shared mailbox.

pub mod frame;
pub mod record;

pub use frame::{FrameBuffer, Orientation, PixelFormat, VideoRotation};
pub use record::{
    deserialize, serialize, serialized_len, DecodedFrame, FrameHeader, FRAME_TAG, HEADER_SIZE,
    PAYLOAD_OFFSET, TRAILER_SIZE,
};
