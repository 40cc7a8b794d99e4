//! Memory-mapped backing region
//!
//! Every access opens the backing file (creating and sizing it if
//! necessary), maps it, performs the byte copy, flushes, and releases the
//! mapping. No lock is held across calls: a call is atomic only with
//! respect to itself, never with respect to the other process. Torn
//! transfers are detected one layer up by the frame record cookie.

use std::fs::OpenOptions;
use std::path::PathBuf;

use memmap2::MmapMut;

use crate::error::MailboxError;

/// Fixed-capacity mapped byte region shared between two processes
#[derive(Debug, Clone)]
pub struct Region {
    path: PathBuf,
    capacity: usize,
}

impl Region {
    /// Describe a region at `path` with the given capacity
    ///
    /// Nothing is opened until the first access.
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    /// Region capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy `data` into the region at `offset` and flush
    pub fn write(&self, data: &[u8], offset: usize) -> Result<(), MailboxError> {
        self.check_range(offset, data.len())?;

        let mut map = self.map()?;
        map[offset..offset + data.len()].copy_from_slice(data);
        map.flush().map_err(MailboxError::Map)?;
        Ok(())
    }

    /// Copy `count` bytes out of the region starting at `offset`
    pub fn read(&self, count: usize, offset: usize) -> Result<Vec<u8>, MailboxError> {
        self.check_range(offset, count)?;

        let map = self.map()?;
        Ok(map[offset..offset + count].to_vec())
    }

    /// Zero-fill the entire region and flush
    pub fn fill_zero(&self) -> Result<(), MailboxError> {
        let mut map = self.map()?;
        map.fill(0);
        map.flush().map_err(MailboxError::Map)?;
        Ok(())
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<(), MailboxError> {
        let end = offset.checked_add(len);
        match end {
            Some(end) if end <= self.capacity => Ok(()),
            _ => Err(MailboxError::OutOfRange {
                offset,
                len,
                capacity: self.capacity,
            }),
        }
    }

    /// Open-or-create the backing file at full capacity and map it
    fn map(&self) -> Result<MmapMut, MailboxError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)
            .map_err(MailboxError::Open)?;

        let len = file.metadata().map_err(MailboxError::Open)?.len();
        if len < self.capacity as u64 {
            file.set_len(self.capacity as u64)
                .map_err(MailboxError::Resize)?;
        }

        // Safety: the file stays at least `capacity` long for the lifetime
        // of the map; concurrent writers can tear contents but not the map.
        unsafe { MmapMut::map_mut(&file) }.map_err(MailboxError::Map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_region(name: &str, capacity: usize) -> Region {
        let path = std::env::temp_dir().join(format!(
            "screenbridge-region-{}-{}.mmap",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        Region::new(path, capacity)
    }

    #[test]
    fn test_write_read_round_trip() {
        let region = temp_region("rw", 128);

        region.write(b"hello", 0).unwrap();
        assert_eq!(region.read(5, 0).unwrap(), b"hello");

        region.write(b"xy", 100).unwrap();
        assert_eq!(region.read(2, 100).unwrap(), b"xy");
    }

    #[test]
    fn test_fill_zero() {
        let region = temp_region("zero", 64);

        region.write(&[0xFF; 64], 0).unwrap();
        region.fill_zero().unwrap();
        assert_eq!(region.read(64, 0).unwrap(), vec![0u8; 64]);
    }

    #[test]
    fn test_out_of_range() {
        let region = temp_region("oor", 16);

        assert!(matches!(
            region.write(&[0u8; 17], 0),
            Err(MailboxError::OutOfRange { .. })
        ));
        assert!(matches!(
            region.read(1, 16),
            Err(MailboxError::OutOfRange { .. })
        ));
        // Overflowing offset+len must not wrap
        assert!(matches!(
            region.read(usize::MAX, 2),
            Err(MailboxError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_open_failure_is_an_error_not_a_panic() {
        let region = Region::new("/nonexistent-dir/definitely/not/here.mmap", 16);
        assert!(matches!(region.read(1, 0), Err(MailboxError::Open(_))));
        assert!(matches!(region.write(b"x", 0), Err(MailboxError::Open(_))));
    }
}
