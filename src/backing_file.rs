//! Seekable byte-source abstraction over the database file.
//!
//! `StorageEngine` is written once against the `BackingFile` trait rather
//! than a concrete `File`, so tests can supply an in-memory
//! `Cursor<Vec<u8>>` fixture instead of a file on disk.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use crate::error::Result;

pub trait BackingFile {
    /// Fills `buf` completely, starting at byte offset `pos`.
    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<()>;
}

impl<T: Read + Seek> BackingFile for T {
    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<()> {
        self.seek(SeekFrom::Start(pos))?;
        self.read_exact(buf)?;
        Ok(())
    }
}

/// Opens a database file at `path` for read-only access.
pub fn open(path: impl AsRef<std::path::Path>) -> Result<File> {
    Ok(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_from_arbitrary_offset() {
        let data = (0u8..=255).collect::<Vec<u8>>();
        let mut cursor = Cursor::new(data);
        let mut buf = [0u8; 4];
        cursor.read_at(10, &mut buf).unwrap();
        assert_eq!(buf, [10, 11, 12, 13]);
    }

    #[test]
    fn short_read_errors() {
        let mut cursor = Cursor::new(vec![1, 2, 3]);
        let mut buf = [0u8; 10];
        assert!(cursor.read_at(0, &mut buf).is_err());
    }
}
