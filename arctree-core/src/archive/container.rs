use std::sync::Arc;

use arctree_codecs::{ArchiveEntry, EntryStream};
use log::debug;

use crate::archive::ArchiveContent;
use crate::error::{Error, NodeKind, Result};
use crate::handle::ArchiveHandle;
use crate::node::{normalize_archive_path, Children, Depth, DirectoryOps, Node, NodeOps};
use crate::options::{DirectoryMatch, Traversal};
use crate::resolve::resolve_possible_container;

/// Where a container's archive bytes came from.
#[derive(Debug)]
enum Origin {
    /// Opened over a stream supplied from outside, e.g. a real file.
    Root { source: Box<Node> },
    /// Opened over the in-memory bytes of an entry in another archive.
    Nested { parent: ArchiveHandle, entry: ArchiveEntry },
}

/// An open archive presented as a directory.
///
/// The container owns the handle it opened and closes it on `dispose`. Nested
/// containers own a separate session over their own buffer: disposing one never
/// touches the parent's handle, and closing the parent leaves the nested session
/// readable (only `input_stream`, which re-extracts from the parent, stops working).
#[derive(Debug)]
pub struct ArchiveContainer {
    name: String,
    name_override: Option<String>,
    handle: ArchiveHandle,
    origin: Origin,
    nesting: usize,
    traversal: Arc<Traversal>,
}

impl ArchiveContainer {
    /// Wrap `source`, whose bytes `handle` was opened over.
    pub(crate) fn wrap(source: Node, handle: ArchiveHandle, traversal: Arc<Traversal>) -> Self {
        let name = source.name().to_string();

        let (origin, nesting) = match source {
            Node::ArchiveContent(content) => {
                let nesting = content.nesting() + 1;
                debug!("Descending into nested archive {} at level {}", name, nesting);
                let origin = Origin::Nested {
                    parent: content.handle().clone(),
                    entry: content.entry().clone(),
                };
                (origin, nesting)
            }
            other => (Origin::Root { source: Box::new(other) }, 0),
        };

        Self {
            name,
            name_override: None,
            handle,
            origin,
            nesting,
            traversal,
        }
    }

    pub fn handle(&self) -> &ArchiveHandle {
        &self.handle
    }

    /// 0 for an archive opened from outside, parent level + 1 for nested ones.
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    pub fn is_nested(&self) -> bool {
        matches!(self.origin, Origin::Nested { .. })
    }

    /// Handle of the archive this one was extracted from.
    pub fn parent_handle(&self) -> Option<&ArchiveHandle> {
        match &self.origin {
            Origin::Nested { parent, .. } => Some(parent),
            Origin::Root { .. } => None,
        }
    }

    /// Entry in the parent archive this one was extracted from.
    pub fn source_entry(&self) -> Option<&ArchiveEntry> {
        match &self.origin {
            Origin::Nested { entry, .. } => Some(entry),
            Origin::Root { .. } => None,
        }
    }

    /// The unresolved node a root container was opened from.
    pub fn source(&self) -> Option<&Node> {
        match &self.origin {
            Origin::Root { source } => Some(source),
            Origin::Nested { .. } => None,
        }
    }

    /// Whether a non-directory entry is recorded under exactly `path`.
    pub fn file_exists(&self, path: &str) -> Result<bool> {
        let path = normalize_archive_path(path);
        Ok(self.handle.entries()?.iter().any(|e| !e.is_dir && e.name == path))
    }

    fn resolve_entry(&self, entry: ArchiveEntry) -> Node {
        let content = ArchiveContent::new(self.handle.clone(), entry, self.nesting);
        resolve_possible_container(Node::ArchiveContent(content), &self.traversal)
    }

    fn matching_entries(
        &self,
        directory: &str,
        depth: Depth,
    ) -> Result<impl Iterator<Item = ArchiveEntry>> {
        let directory = normalize_archive_path(directory);
        let mode = self.traversal.options().directory_match;
        Ok(self
            .handle
            .entries()?
            .into_iter()
            .filter(move |entry| entry_in_directory(entry, &directory, depth, mode)))
    }
}

impl NodeOps for ArchiveContainer {
    fn kind(&self) -> NodeKind {
        NodeKind::ArchiveContainer
    }

    fn name(&self) -> &str {
        self.name_override.as_deref().unwrap_or(&self.name)
    }

    fn set_name(&mut self, name: &str) {
        self.name_override = Some(name.to_string());
    }

    fn is_directory(&self) -> bool {
        true
    }

    /// Every recorded entry, directory entries included. Entries named like archives
    /// are extracted and opened right away, while iterating.
    fn children(&self) -> Result<Children<'_>> {
        let entries = self.handle.entries()?;
        Ok(Box::new(entries.into_iter().map(move |entry| self.resolve_entry(entry))))
    }

    /// For a nested container, a fresh in-memory copy of the entry it came from,
    /// re-extracted from the parent on every call.
    fn input_stream(&self) -> Result<EntryStream> {
        match &self.origin {
            Origin::Nested { parent, entry } => {
                Ok(EntryStream::from_bytes(parent.extract_bytes(entry.index)?))
            }
            Origin::Root { .. } => Err(Error::unsupported("input_stream", self.kind())),
        }
    }

    fn dispose(&mut self) {
        if self.handle.close() {
            debug!("Disposed container {}", self.name);
        }
    }
}

impl DirectoryOps for ArchiveContainer {
    /// Lookup at `path`'s directory level, matching the final segment exactly.
    fn get_file(&self, path: &str) -> Result<Option<Node>> {
        let path = normalize_archive_path(path);
        let (directory, file_name) = path.rsplit_once('/').unwrap_or(("", path.as_str()));

        let found = self
            .matching_entries(directory, Depth::TopLevelOnly)?
            .find(|entry| entry.file_name() == file_name);
        Ok(found.map(|entry| self.resolve_entry(entry)))
    }

    fn get_files(&self, directory: &str, depth: Depth) -> Result<Vec<Node>> {
        Ok(self
            .matching_entries(directory, depth)?
            .map(|entry| self.resolve_entry(entry))
            .collect())
    }

    /// The non-directory entry whose full recorded name is `name`.
    fn has_file(&self, name: &str) -> Result<Option<Node>> {
        let name = normalize_archive_path(name);
        let found = self
            .handle
            .entries()?
            .into_iter()
            .find(|entry| !entry.is_dir && entry.name == name);
        Ok(found.map(|entry| self.resolve_entry(entry)))
    }
}

/// Directory filter over a flat entry list. `directory` is already normalized.
///
/// An entry qualifies when it is not a directory entry and either
/// - `directory` is the root, the query is top-level only and the entry has one segment,
/// - the entry's parent path equals `directory`, or
/// - the query covers all levels and the parent path lies under `directory` per `mode`.
pub(crate) fn entry_in_directory(
    entry: &ArchiveEntry,
    directory: &str,
    depth: Depth,
    mode: DirectoryMatch,
) -> bool {
    if entry.is_dir {
        return false;
    }

    let parent = entry.parent_dir();
    if directory.is_empty() && depth == Depth::TopLevelOnly && !entry.name.contains('/') {
        return true;
    }
    if parent == directory {
        return true;
    }

    if depth == Depth::AllLevels {
        return match mode {
            DirectoryMatch::Substring => parent.contains(directory),
            DirectoryMatch::SegmentPrefix => {
                directory.is_empty()
                    || parent
                        .strip_prefix(directory)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        };
    }

    false
}
