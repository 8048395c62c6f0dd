//! The polymorphic node type.
//!
//! A [`Node`] is one of four variants: a real directory, a real file, an open
//! archive presented as a directory (container), or one entry inside an archive
//! (content). Every variant implements [`NodeOps`]; only directory-like variants
//! implement [`DirectoryOps`]. Calling a directory operation through [`Node`] on a
//! file-like variant fails with [`Error::Unsupported`].
//!
//! `children()` is not cached: each call re-lists the directory or archive and
//! re-resolves nested archives.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use arctree_codecs::EntryStream;

use crate::archive::{ArchiveContainer, ArchiveContent};
use crate::error::{Error, NodeKind, Result};
use crate::options::Traversal;
use crate::real::{RealDirectory, RealFile};
use crate::resolve::resolve_possible_container;

/// Lazily produced child sequence.
pub type Children<'a> = Box<dyn Iterator<Item = Node> + 'a>;

/// Scope of a directory query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    /// Only entries directly inside the directory.
    TopLevelOnly,
    /// Entries at any level below the directory.
    AllLevels,
}

/// Capabilities every node variant has.
pub trait NodeOps {
    fn kind(&self) -> NodeKind;

    fn name(&self) -> &str;

    /// Override the name. OS-backed variants ignore this.
    fn set_name(&mut self, _name: &str) {}

    fn is_directory(&self) -> bool;

    fn is_file(&self) -> bool {
        !self.is_directory()
    }

    fn children(&self) -> Result<Children<'_>>;

    /// A readable stream over this node's bytes. File-like variants only.
    fn input_stream(&self) -> Result<EntryStream>;

    /// Release what this node owns: archive handles it opened, cached buffers.
    fn dispose(&mut self) {}
}

/// Path queries available on directory-like variants.
pub trait DirectoryOps {
    /// Find one file by path; `Ok(None)` when absent.
    fn get_file(&self, path: &str) -> Result<Option<Node>>;

    /// Files under `directory` (`""` is the root), resolved into containers where applicable.
    fn get_files(&self, directory: &str, depth: Depth) -> Result<Vec<Node>>;

    /// Find a direct member by name; `Ok(None)` when absent.
    fn has_file(&self, name: &str) -> Result<Option<Node>>;
}

#[derive(Debug)]
pub enum Node {
    RealDirectory(RealDirectory),
    RealFile(RealFile),
    ArchiveContainer(ArchiveContainer),
    ArchiveContent(ArchiveContent),
}

impl Node {
    /// Build a node for `path` with default options.
    ///
    /// Directories become [`RealDirectory`]; files go through container resolution,
    /// so `bundle.zip` comes back as an [`ArchiveContainer`].
    pub fn create(path: impl AsRef<Path>) -> Result<Node> {
        Self::create_with(path, &Arc::new(Traversal::default()))
    }

    pub fn create_with(path: impl AsRef<Path>, traversal: &Arc<Traversal>) -> Result<Node> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;

        if metadata.is_dir() {
            return Ok(Node::RealDirectory(RealDirectory::new(path, traversal.clone())));
        }
        Ok(resolve_possible_container(Node::RealFile(RealFile::new(path)), traversal))
    }

    fn ops(&self) -> &dyn NodeOps {
        match self {
            Node::RealDirectory(n) => n,
            Node::RealFile(n) => n,
            Node::ArchiveContainer(n) => n,
            Node::ArchiveContent(n) => n,
        }
    }

    fn ops_mut(&mut self) -> &mut dyn NodeOps {
        match self {
            Node::RealDirectory(n) => n,
            Node::RealFile(n) => n,
            Node::ArchiveContainer(n) => n,
            Node::ArchiveContent(n) => n,
        }
    }

    /// The directory-query view, for variants that have one.
    pub fn as_directory(&self) -> Option<&dyn DirectoryOps> {
        match self {
            Node::RealDirectory(n) => Some(n),
            Node::ArchiveContainer(n) => Some(n),
            Node::RealFile(_) | Node::ArchiveContent(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&ArchiveContainer> {
        match self {
            Node::ArchiveContainer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_content(&self) -> Option<&ArchiveContent> {
        match self {
            Node::ArchiveContent(n) => Some(n),
            _ => None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.ops().kind()
    }

    pub fn name(&self) -> &str {
        self.ops().name()
    }

    pub fn set_name(&mut self, name: &str) {
        self.ops_mut().set_name(name)
    }

    pub fn is_directory(&self) -> bool {
        self.ops().is_directory()
    }

    pub fn is_file(&self) -> bool {
        self.ops().is_file()
    }

    pub fn children(&self) -> Result<Children<'_>> {
        self.ops().children()
    }

    pub fn input_stream(&self) -> Result<EntryStream> {
        self.ops().input_stream()
    }

    pub fn dispose(&mut self) {
        self.ops_mut().dispose()
    }

    pub fn get_file(&self, path: &str) -> Result<Option<Node>> {
        self.directory_ops("get_file")?.get_file(path)
    }

    pub fn get_files(&self, directory: &str, depth: Depth) -> Result<Vec<Node>> {
        self.directory_ops("get_files")?.get_files(directory, depth)
    }

    pub fn has_file(&self, name: &str) -> Result<Option<Node>> {
        self.directory_ops("has_file")?.has_file(name)
    }

    /// Name equality, the way listings of two trees are matched up. Kinds are not compared.
    pub fn same_name(&self, other: &Node) -> bool {
        self.name() == other.name()
    }

    fn directory_ops(&self, op: &'static str) -> Result<&dyn DirectoryOps> {
        self.as_directory().ok_or_else(|| Error::unsupported(op, self.kind()))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical form of a caller-supplied archive path: `/` separators, no leading
/// `./` or surrounding slashes.
pub(crate) fn normalize_archive_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.trim_start_matches("./");
    path.trim_matches('/').to_string()
}
