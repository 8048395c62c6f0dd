//! Container resolution: deciding whether a file-like node is really an archive.
//!
//! Detection is by name only (`.zip`, `.7z`, ASCII case-insensitive). A node that
//! matches is opened with the codecs and wrapped in an [`ArchiveContainer`]. Any
//! failure on the way is logged and the original node is returned as-is, so one
//! corrupt or misnamed archive never aborts a traversal.

use std::sync::Arc;

use arctree_codecs::{ArchiveFormat, EntryStream};
use log::{debug, warn};

use crate::archive::{ArchiveContainer, ArchiveContent};
use crate::error::Result;
use crate::handle::ArchiveHandle;
use crate::node::Node;
use crate::options::{Traversal, TraversalOptions};

/// Resolve `node` into an archive container when its name says it is one.
///
/// Directory-like nodes, containers included, come back unchanged.
pub fn resolve_possible_container(node: Node, traversal: &Arc<Traversal>) -> Node {
    if node.is_directory() {
        return node;
    }

    let Some(format) = ArchiveFormat::from_name(node.name()) else {
        return node;
    };

    if !traversal.codecs().supports(format) {
        debug!("No {} backend; leaving {} as a file", format, node.name());
        return node;
    }

    if let Node::ArchiveContent(content) = &node {
        if let Some(reason) = nested_descent_blocked(content, traversal.options()) {
            debug!("Not descending into {}: {}", node.name(), reason);
            return node;
        }
    }

    match open_handle(&node, format, traversal) {
        Ok(handle) => {
            Node::ArchiveContainer(ArchiveContainer::wrap(node, handle, traversal.clone()))
        }
        Err(e) => {
            warn!("Treating {} as a plain file: {}", node.name(), e);
            node
        }
    }
}

fn open_handle(node: &Node, format: ArchiveFormat, traversal: &Traversal) -> Result<ArchiveHandle> {
    // Nested archives are materialized in memory, so the byte cap applies to what the
    // codec actually produces, not only to the size the entry header claims.
    let stream = match node {
        Node::ArchiveContent(content) => {
            let limit = traversal.options().max_nested_archive_bytes;
            EntryStream::from_bytes(content.bytes_capped(limit)?)
        }
        _ => node.input_stream()?,
    };
    ArchiveHandle::open(node.name(), Some(format), stream, traversal.codecs())
}

fn nested_descent_blocked(content: &ArchiveContent, opts: &TraversalOptions) -> Option<String> {
    let level = content.nesting() + 1;
    if level > opts.max_nesting_depth {
        return Some(format!("nesting level {} exceeds {}", level, opts.max_nesting_depth));
    }

    let size = content.entry().size;
    if size > opts.max_nested_archive_bytes {
        return Some(format!("{} bytes exceeds {}", size, opts.max_nested_archive_bytes));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::real::RealFile;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_plain_file_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        let traversal = Arc::new(Traversal::default());
        let node = resolve_possible_container(Node::RealFile(RealFile::new(&path)), &traversal);
        assert!(matches!(node, Node::RealFile(_)));
    }

    #[test]
    fn test_corrupt_archive_degrades_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.zip");
        fs::write(&path, "this is not a zip archive").unwrap();

        let traversal = Arc::new(Traversal::default());
        let node = resolve_possible_container(Node::RealFile(RealFile::new(&path)), &traversal);
        assert!(matches!(node, Node::RealFile(_)));
        assert!(node.is_file());
        assert_eq!(node.name(), "bad.zip");
    }

    #[test]
    fn test_unreadable_archive_degrades_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.7z");

        let traversal = Arc::new(Traversal::default());
        let node = resolve_possible_container(Node::RealFile(RealFile::new(&path)), &traversal);
        assert!(node.is_file());
    }
}
