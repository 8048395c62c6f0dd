//! arctree core: one node tree over real directories and the archives inside them.
//!
//! [`Node::create`] turns a filesystem path into a node. Directories list their
//! members; files named `*.zip` or `*.7z` are opened and presented as directories
//! themselves, recursively, so an archive inside an archive is just another level
//! of the tree. Callers walk the tree through [`NodeOps`] and [`DirectoryOps`]
//! without knowing which variant backs a node.
//!
//! ```no_run
//! use arctree_core::{Depth, Node};
//!
//! # fn main() -> arctree_core::Result<()> {
//! let root = Node::create("bundle.zip")?;
//! for node in root.get_files("", Depth::AllLevels)? {
//!     println!("{} ({})", node.name(), node.kind());
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod error;
pub mod handle;
pub mod node;
pub mod options;
pub mod real;
pub mod resolve;
pub mod walk;

pub use archive::{ArchiveContainer, ArchiveContent};
pub use error::{Error, NodeKind, Result};
pub use handle::ArchiveHandle;
pub use node::{Children, Depth, DirectoryOps, Node, NodeOps};
pub use options::{DirectoryMatch, Traversal, TraversalOptions};
pub use real::{RealDirectory, RealFile};
pub use resolve::resolve_possible_container;
pub use walk::{flatten, read_all, walk, WalkControl};

pub use arctree_codecs::{ArchiveEntry, ArchiveFormat, CodecOptions, EntryStream};
