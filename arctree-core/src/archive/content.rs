use arctree_codecs::{ArchiveEntry, EntryStream};
use bytes::Bytes;
use once_cell::sync::OnceCell;

use crate::error::{Error, NodeKind, Result};
use crate::handle::ArchiveHandle;
use crate::node::{Children, NodeOps};

/// One entry inside an archive.
///
/// The entry's bytes are extracted through the (borrowed, not owned) handle on the
/// first `input_stream` call and kept for the node's lifetime. Later calls return a
/// new cursor at offset 0 over the same bytes, and keep working after the handle
/// is closed. A failed extraction is returned as an error and nothing is cached.
#[derive(Debug)]
pub struct ArchiveContent {
    handle: ArchiveHandle,
    entry: ArchiveEntry,
    name_override: Option<String>,
    nesting: usize,
    cache: OnceCell<Bytes>,
}

impl ArchiveContent {
    pub(crate) fn new(handle: ArchiveHandle, entry: ArchiveEntry, nesting: usize) -> Self {
        Self {
            handle,
            entry,
            name_override: None,
            nesting,
            cache: OnceCell::new(),
        }
    }

    pub fn entry(&self) -> &ArchiveEntry {
        &self.entry
    }

    /// Handle of the archive this entry was listed from.
    pub fn handle(&self) -> &ArchiveHandle {
        &self.handle
    }

    /// Nesting level of the archive holding this entry (0 for an outermost archive).
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    /// The entry's bytes, extracting them on first use.
    pub fn bytes(&self) -> Result<Bytes> {
        self.bytes_with(|| self.handle.extract_bytes(self.entry.index))
    }

    /// As [`bytes`](Self::bytes), but a first extraction producing more than `limit`
    /// bytes fails with `Error::LimitExceeded` and caches nothing.
    pub fn bytes_capped(&self, limit: u64) -> Result<Bytes> {
        self.bytes_with(|| self.handle.extract_bytes_capped(self.entry.index, limit))
    }

    fn bytes_with(&self, extract: impl FnOnce() -> Result<Bytes>) -> Result<Bytes> {
        if self.entry.is_dir {
            return Err(Error::unsupported("input_stream", self.kind()));
        }
        self.cache.get_or_try_init(extract).cloned()
    }
}

impl NodeOps for ArchiveContent {
    fn kind(&self) -> NodeKind {
        NodeKind::ArchiveContent
    }

    fn name(&self) -> &str {
        self.name_override.as_deref().unwrap_or(&self.entry.name)
    }

    fn set_name(&mut self, name: &str) {
        self.name_override = Some(name.to_string());
    }

    fn is_directory(&self) -> bool {
        self.entry.is_dir
    }

    fn children(&self) -> Result<Children<'_>> {
        Ok(Box::new(std::iter::empty()))
    }

    fn input_stream(&self) -> Result<EntryStream> {
        Ok(EntryStream::from_bytes(self.bytes()?))
    }

    fn dispose(&mut self) {
        self.cache.take();
    }
}
