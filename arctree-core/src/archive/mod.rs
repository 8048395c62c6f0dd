//! Archive-backed nodes: the container that presents an open archive as a
//! directory, and the content node for a single entry.

mod container;
mod content;

pub use container::ArchiveContainer;
pub use content::ArchiveContent;
