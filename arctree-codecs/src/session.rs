use std::io::Write;

use crate::error::Result;
use crate::format::ArchiveFormat;

/// One entry as recorded by the archive's own directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position in the codec's entry table; the key for extraction.
    pub index: usize,
    /// Recorded path, always `/`-separated.
    pub name: String,
    pub is_dir: bool,
    /// Uncompressed size as recorded by the archive.
    pub size: u64,
}

impl ArchiveEntry {
    pub fn new(index: usize, name: &str, is_dir: bool, size: u64) -> Self {
        let name = name.replace('\\', "/");
        let is_dir = is_dir || name.ends_with('/');
        Self {
            index,
            name: name.trim_end_matches('/').to_string(),
            is_dir,
            size,
        }
    }

    /// Final path segment of the recorded name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Everything before the final segment, or `""` for top-level entries.
    pub fn parent_dir(&self) -> &str {
        self.name.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }
}

/// An open codec session over a single byte stream.
///
/// Dropping the session closes it and releases the stream it was opened from.
pub trait ArchiveSession: Send {
    fn format(&self) -> ArchiveFormat;

    /// Flat list of every entry, in codec order.
    fn entries(&mut self) -> Result<Vec<ArchiveEntry>>;

    /// Write the full contents of entry `index` into `writer`; returns the byte count.
    fn extract(&mut self, index: usize, writer: &mut dyn Write) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_paths() {
        let entry = ArchiveEntry::new(0, "sub\\deep\\b.txt", false, 5);
        assert_eq!(entry.name, "sub/deep/b.txt");
        assert_eq!(entry.file_name(), "b.txt");
        assert_eq!(entry.parent_dir(), "sub/deep");

        let top = ArchiveEntry::new(1, "a.txt", false, 1);
        assert_eq!(top.file_name(), "a.txt");
        assert_eq!(top.parent_dir(), "");

        let dir = ArchiveEntry::new(2, "sub/", false, 0);
        assert!(dir.is_dir);
        assert_eq!(dir.name, "sub");
    }
}
