//! Memory-mapped word buffers (`feature = "mmap"`).
//!
//! A thin wrapper over [`memmap2::Mmap`] that exposes the mapped file as a
//! `&[u32]` word slice via [`crate::binary::bytes_to_words`], for reading a
//! buffer written with [`crate::binary::words_to_bytes`] without copying it
//! into the heap first. This is additive on top of the `std` I/O path
//! ([`crate::binary::Source`]/[`crate::binary::Sink`] over `std::io`); it
//! does not replace it.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::binary;
use crate::error::BonsaiError;

/// A read-only memory-mapped file, reinterpreted as a slice of 32-bit words.
pub struct MmapWords {
    mmap: Mmap,
}

impl MmapWords {
    /// Map `path` read-only. The file's length must be a multiple of 4 bytes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BonsaiError> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only for the lifetime of `Self`; the
        // caller is responsible for not concurrently truncating the backing
        // file, the same caveat `memmap2::Mmap::map` documents.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap })
    }

    /// The mapped region as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// The mapped region reinterpreted as 32-bit words. `None` if the
    /// mapped length is not a multiple of 4.
    pub fn try_as_words(&self) -> Option<&[u32]> {
        binary::try_bytes_to_words(&self.mmap)
    }

    /// As [`Self::try_as_words`], panicking on a misaligned length.
    pub fn as_words(&self) -> &[u32] {
        binary::bytes_to_words(&self.mmap)
    }
}

#[cfg(all(test, feature = "mmap-tests"))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn roundtrips_a_word_buffer_through_a_temp_file() {
        let words: Vec<u32> = vec![0xDEAD_BEEF, 0x1234_5678, 0];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(binary::words_to_bytes(&words)).unwrap();
        file.flush().unwrap();

        let mapped = MmapWords::open(file.path()).unwrap();
        assert_eq!(mapped.as_words(), &words[..]);
    }

    #[test]
    fn rejects_misaligned_file_length() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
        file.flush().unwrap();

        let mapped = MmapWords::open(file.path()).unwrap();
        assert!(mapped.try_as_words().is_none());
    }
}
