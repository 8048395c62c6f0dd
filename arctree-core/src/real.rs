//! Adapters over the OS filesystem. No archive awareness of their own: archive
//! files found while listing are handed to the resolver.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arctree_codecs::EntryStream;
use log::warn;
use walkdir::WalkDir;

use crate::error::{Error, NodeKind, Result};
use crate::node::{Children, Depth, DirectoryOps, Node, NodeOps};
use crate::options::Traversal;
use crate::resolve::resolve_possible_container;

#[derive(Debug)]
pub struct RealDirectory {
    path: PathBuf,
    name: String,
    traversal: Arc<Traversal>,
}

impl RealDirectory {
    pub fn new(path: impl Into<PathBuf>, traversal: Arc<Traversal>) -> Self {
        let path = path.into();
        let name = directory_name(&path);
        Self { path, name, traversal }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_node(&self, path: PathBuf) -> Node {
        resolve_possible_container(Node::RealFile(RealFile::new(path)), &self.traversal)
    }

    fn is_own_path(&self, dir: &Path) -> bool {
        if dir == self.path {
            return true;
        }
        match (fs::canonicalize(dir), fs::canonicalize(&self.path)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl NodeOps for RealDirectory {
    fn kind(&self) -> NodeKind {
        NodeKind::RealDirectory
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_directory(&self) -> bool {
        true
    }

    /// Subdirectories first, then files; files named like archives come back as containers.
    fn children(&self) -> Result<Children<'_>> {
        let read_dir = fs::read_dir(&self.path).map_err(|e| Error::io(&self.path, e))?;

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in read_dir {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.path.display(), e);
                    continue;
                }
            };
            // Follows symlinks, so a link to a directory lists as a directory.
            match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => dirs.push(path),
                Ok(meta) if meta.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        if self.traversal.options().sort_children {
            dirs.sort();
            files.sort();
        }

        let dir_traversal = self.traversal.clone();
        let dirs = dirs
            .into_iter()
            .map(move |path| Node::RealDirectory(RealDirectory::new(path, dir_traversal.clone())));
        let files = files.into_iter().map(move |path| self.file_node(path));

        Ok(Box::new(dirs.chain(files)))
    }

    fn input_stream(&self) -> Result<EntryStream> {
        Err(Error::unsupported("input_stream", self.kind()))
    }
}

impl DirectoryOps for RealDirectory {
    /// `path` is absolute or relative to this directory. Anything whose parent is
    /// not this directory is absent.
    fn get_file(&self, path: &str) -> Result<Option<Node>> {
        let candidate = Path::new(path);
        let full = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.path.join(candidate)
        };

        let in_scope = full.parent().is_some_and(|parent| self.is_own_path(parent));
        if in_scope && full.is_file() {
            return Ok(Some(self.file_node(full)));
        }
        Ok(None)
    }

    fn get_files(&self, directory: &str, depth: Depth) -> Result<Vec<Node>> {
        let directory = directory.trim_matches(['/', '\\']);
        let base = if directory.is_empty() {
            self.path.clone()
        } else {
            self.path.join(directory)
        };
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let max_depth = match depth {
            Depth::TopLevelOnly => 1,
            Depth::AllLevels => usize::MAX,
        };

        let mut nodes = Vec::new();
        for entry in WalkDir::new(&base)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    nodes.push(self.file_node(entry.into_path()))
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping entry under {}: {}", base.display(), e),
            }
        }

        Ok(nodes)
    }

    /// Direct member named `name`, file or subdirectory.
    fn has_file(&self, name: &str) -> Result<Option<Node>> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Ok(None);
        }

        let full = self.path.join(name);
        match fs::metadata(&full) {
            Ok(meta) if meta.is_dir() => {
                let dir = RealDirectory::new(full, self.traversal.clone());
                Ok(Some(Node::RealDirectory(dir)))
            }
            Ok(meta) if meta.is_file() => Ok(Some(self.file_node(full))),
            _ => Ok(None),
        }
    }
}

/// A leaf over one OS file. Each `input_stream` call opens a fresh handle.
#[derive(Debug, Clone)]
pub struct RealFile {
    path: PathBuf,
    name: String,
}

impl RealFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NodeOps for RealFile {
    fn kind(&self) -> NodeKind {
        NodeKind::RealFile
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_directory(&self) -> bool {
        false
    }

    fn children(&self) -> Result<Children<'_>> {
        Ok(Box::new(std::iter::empty()))
    }

    fn input_stream(&self) -> Result<EntryStream> {
        let file = File::open(&self.path).map_err(|e| Error::io(&self.path, e))?;
        Ok(EntryStream::from_file(file))
    }
}

/// `file_name`, falling back to the canonical path for `.` and `..`.
fn directory_name(path: &Path) -> String {
    if let Some(name) = path.file_name() {
        return name.to_string_lossy().into_owned();
    }
    fs::canonicalize(path)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn traversal() -> Arc<Traversal> {
        Arc::new(Traversal::default())
    }

    #[test]
    fn test_real_file_is_a_leaf_with_fresh_streams() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "x").unwrap();

        let mut file = RealFile::new(&path);
        assert_eq!(file.name(), "doc.txt");
        assert!(file.is_file());
        assert_eq!(file.children().unwrap().count(), 0);

        file.set_name("renamed.txt");
        assert_eq!(file.name(), "doc.txt");

        for _ in 0..2 {
            let mut out = String::new();
            file.input_stream().unwrap().read_to_string(&mut out).unwrap();
            assert_eq!(out, "x");
        }
    }

    #[test]
    fn test_children_lists_dirs_then_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        let real = RealDirectory::new(dir.path(), traversal());
        let names: Vec<String> = real.children().unwrap().map(|n| n.name().to_string()).collect();
        assert_eq!(names, ["zeta", "a.txt", "b.txt"]);

        // Not cached: a new file shows up on the next call.
        fs::write(dir.path().join("c.txt"), "c").unwrap();
        assert_eq!(real.children().unwrap().count(), 4);
    }

    #[test]
    fn test_get_file_scoped_to_own_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("top.txt"), "t").unwrap();
        fs::write(dir.path().join("sub").join("inner.txt"), "i").unwrap();

        let real = RealDirectory::new(dir.path(), traversal());
        let found = real.get_file("top.txt").unwrap().expect("top.txt");
        assert_eq!(found.name(), "top.txt");

        let absolute = dir.path().join("top.txt");
        assert!(real.get_file(absolute.to_str().unwrap()).unwrap().is_some());

        assert!(real.get_file("sub/inner.txt").unwrap().is_none());
        assert!(real.get_file("missing.txt").unwrap().is_none());
    }

    #[test]
    fn test_get_files_depth() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub").join("deep")).unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("sub").join("deep").join("c.txt"), "c").unwrap();

        let real = RealDirectory::new(dir.path(), traversal());
        let names = |nodes: Vec<Node>| {
            nodes.iter().map(|n| n.name().to_string()).collect::<Vec<_>>()
        };

        assert_eq!(names(real.get_files("", Depth::TopLevelOnly).unwrap()), ["a.txt"]);
        assert_eq!(names(real.get_files("", Depth::AllLevels).unwrap()).len(), 3);
        assert_eq!(names(real.get_files("sub", Depth::TopLevelOnly).unwrap()), ["b.txt"]);
        assert_eq!(names(real.get_files("sub", Depth::AllLevels).unwrap()), ["b.txt", "c.txt"]);
        assert!(real.get_files("nope", Depth::AllLevels).unwrap().is_empty());
    }

    #[test]
    fn test_has_file_finds_direct_members() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        let real = RealDirectory::new(dir.path(), traversal());
        assert!(real.has_file("a.txt").unwrap().unwrap().is_file());
        assert!(real.has_file("sub").unwrap().unwrap().is_directory());
        assert!(real.has_file("missing").unwrap().is_none());
        assert!(real.has_file("sub/a.txt").unwrap().is_none());
    }

    #[test]
    fn test_directory_has_no_stream() {
        let dir = TempDir::new().unwrap();
        let real = RealDirectory::new(dir.path(), traversal());
        assert!(real.input_stream().unwrap_err().is_unsupported());
    }
}
