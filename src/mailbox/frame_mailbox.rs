//! Single-slot frame mailbox
//!
//! The mailbox holds at most one serialized frame record at offset 0 and is
//! overwritten on every captured sample (last-write-wins, no queue). Content
//! state is binary: *clean* (first tag-width bytes all zero) or *dirty*
//! (holds a record). `clear` is the only operation that resets the state.
//!
//! There is deliberately no cross-process lock here. A mutex spanning two
//! processes hangs forever if either side is killed mid-critical-section,
//! which the platform may do to the capture extension at any time. A torn
//! transfer is merely a dropped frame, caught by the record cookie.

use std::path::PathBuf;

use crate::codec::{serialized_len, FRAME_TAG, PAYLOAD_OFFSET};
use crate::config::BroadcastConfig;
use crate::error::MailboxError;

use super::region::Region;

/// Byte offset of the record's `data_size` field, used to size reads
const DATA_SIZE_OFFSET: usize = FRAME_TAG.len() + 24;

/// Shared single-slot frame mailbox
#[derive(Debug, Clone)]
pub struct FrameMailbox {
    region: Region,
}

impl FrameMailbox {
    /// Create a mailbox over the given backing path
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            region: Region::new(path, capacity),
        }
    }

    /// Create a mailbox at the configured container location
    pub fn from_config(config: &BroadcastConfig) -> Self {
        Self::new(config.frame_mailbox_path(), config.mailbox_capacity)
    }

    /// Mailbox capacity in bytes
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Overwrite mailbox content at `offset`
    ///
    /// Returns `false` on any platform failure; the frame is simply lost and
    /// the producer moves on to the next sample.
    pub fn write(&self, data: &[u8], offset: usize) -> bool {
        match self.region.write(data, offset) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Mailbox write skipped");
                false
            }
        }
    }

    /// Read `count` bytes starting at `offset`
    ///
    /// Any platform failure reports as "no data available".
    pub fn read(&self, count: usize, offset: usize) -> Option<Vec<u8>> {
        match self.region.read(count, offset) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::debug!(error = %e, "Mailbox read reported no data");
                None
            }
        }
    }

    /// Zero-fill the entire region
    ///
    /// The only operation guaranteed to reset the clean flag. Failure is
    /// logged and ignored; a later write overwrites the slot anyway.
    pub fn clear(&self) {
        if let Err(e) = self.region.fill_zero() {
            tracing::debug!(error = %e, "Mailbox clear skipped");
        }
    }

    /// Whether the mailbox holds no pending frame
    ///
    /// Inspects the first tag-width bytes; all-zero means clean. An
    /// unreachable mailbox also reads as clean: there is nothing to fetch.
    pub fn is_clean(&self) -> bool {
        match self.read(FRAME_TAG.len(), 0) {
            Some(prefix) => prefix.iter().all(|b| *b == 0),
            None => true,
        }
    }

    /// Read the bytes of the current record, sized from its own header
    ///
    /// Reads the tag + header prefix first, then exactly the declared record
    /// length, so polling never copies the full region. If the declared length
    /// is implausible (torn header), the prefix alone is returned so the
    /// decode step can classify the failure.
    pub fn read_record(&self) -> Option<Vec<u8>> {
        let prefix = self.read(PAYLOAD_OFFSET, 0)?;

        let declared = u32::from_ne_bytes(
            prefix[DATA_SIZE_OFFSET..DATA_SIZE_OFFSET + 4]
                .try_into()
                .expect("data_size slice is 4 bytes"),
        ) as usize;

        let record_len = serialized_len(declared);
        if record_len > self.capacity() {
            return Some(prefix);
        }

        self.read(record_len, 0)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::codec::{deserialize, serialize, FrameBuffer, Orientation, PixelFormat};
    use crate::error::CodecError;

    fn temp_mailbox(name: &str, capacity: usize) -> FrameMailbox {
        let path = std::env::temp_dir().join(format!(
            "screenbridge-mailbox-{}-{}.mmap",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        FrameMailbox::new(path, capacity)
    }

    fn frame_of(len: usize, fill: u8) -> FrameBuffer {
        FrameBuffer::new(
            (len / 4) as u32,
            1,
            PixelFormat::BGRA,
            len as u32,
            Bytes::from(vec![fill; len]),
        )
    }

    #[test]
    fn test_clean_after_clear() {
        let mailbox = temp_mailbox("clean", 4096);

        mailbox.write(b"BBBgarbage", 0);
        assert!(!mailbox.is_clean());

        mailbox.clear();
        assert!(mailbox.is_clean());
        assert!(mailbox.read_record().is_some()); // readable, just zeroes
    }

    #[test]
    fn test_unreachable_mailbox_reads_clean() {
        let mailbox = FrameMailbox::new("/nonexistent-dir/nope/frame.mmap", 4096);
        assert!(mailbox.is_clean());
        assert!(mailbox.read_record().is_none());
    }

    #[test]
    fn test_record_round_trip_through_mailbox() {
        let mailbox = temp_mailbox("roundtrip", 4096);
        mailbox.clear();

        let frame = frame_of(64, 0xAB);
        let wire = serialize(&frame, Orientation::LEFT, 5);
        assert!(mailbox.write(&wire, 0));
        assert!(!mailbox.is_clean());

        let record = mailbox.read_record().unwrap();
        let decoded = deserialize(&record).unwrap();
        assert_eq!(decoded.buffer, frame);
        assert_eq!(decoded.orientation, Orientation::LEFT);
    }

    #[test]
    fn test_overwrite_with_smaller_frame() {
        // Write A then a smaller B: the read must yield exactly B's bytes,
        // with no residual A content misinterpreted as part of B.
        let mailbox = temp_mailbox("overwrite", 4096);
        mailbox.clear();

        let a = frame_of(256, 0xAA);
        mailbox.write(&serialize(&a, Orientation::UP, 1), 0);

        let b = frame_of(32, 0xBB);
        mailbox.write(&serialize(&b, Orientation::UP, 2), 0);

        let decoded = deserialize(&mailbox.read_record().unwrap()).unwrap();
        assert_eq!(decoded.header.timestamp_ns, 2);
        assert_eq!(decoded.buffer.data, b.data);
        assert!(decoded.buffer.data.iter().all(|&x| x == 0xBB));
    }

    #[test]
    fn test_torn_header_returns_prefix_for_classification() {
        let mailbox = temp_mailbox("torn", 4096);
        mailbox.clear();

        // Valid tag, garbage header declaring an implausible payload
        let mut garbage = Vec::new();
        garbage.extend_from_slice(FRAME_TAG);
        garbage.extend_from_slice(&[0xFF; 36]);
        mailbox.write(&garbage, 0);

        let record = mailbox.read_record().unwrap();
        assert!(matches!(
            deserialize(&record),
            Err(CodecError::SizeMismatch)
        ));
    }

    #[test]
    fn test_oversize_write_rejected() {
        let mailbox = temp_mailbox("oversize", 128);
        assert!(!mailbox.write(&vec![1u8; 256], 0));
    }
}
