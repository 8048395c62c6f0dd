use std::fs;
use std::path::Path;
use std::sync::Arc;

use arctree_codecs::{CodecOptions, Codecs};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How `get_files(directory, AllLevels)` decides that an entry lies under `directory`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryMatch {
    /// The entry's parent path equals `directory` or starts with `directory/`.
    #[default]
    SegmentPrefix,
    /// The entry's parent path contains `directory` anywhere, so `sub` also
    /// matches `other/subway`.
    Substring,
}

/// Settings for one tree.
///
/// Notes:
/// - `max_nesting_depth` counts archives inside archives; the outermost archive is level 0.
/// - Nested archives are materialized in memory, so `max_nested_archive_bytes` bounds
///   the memory a single nested descent can take.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalOptions {
    /// Passed to every codec session.
    pub codec: CodecOptions,

    pub directory_match: DirectoryMatch,

    /// Archives nested deeper than this stay plain content nodes.
    pub max_nesting_depth: usize,

    /// Nested archive entries larger than this stay plain content nodes.
    pub max_nested_archive_bytes: u64,

    /// List real directories as sorted subdirectories followed by sorted files.
    pub sort_children: bool,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            codec: CodecOptions::default(),
            directory_match: DirectoryMatch::default(),
            max_nesting_depth: 10,
            max_nested_archive_bytes: 512 * 1024 * 1024, // 512 MiB
            sort_children: true,
        }
    }
}

impl TraversalOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&text)
    }
}

/// Options plus the codec instance, shared by every node of one tree.
#[derive(Debug, Default)]
pub struct Traversal {
    opts: TraversalOptions,
    codecs: Codecs,
}

impl Traversal {
    pub fn new(opts: TraversalOptions) -> Arc<Self> {
        let codecs = Codecs::new(opts.codec.clone());
        Arc::new(Self { opts, codecs })
    }

    pub fn options(&self) -> &TraversalOptions {
        &self.opts
    }

    pub fn codecs(&self) -> &Codecs {
        &self.codecs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_partial_json() {
        let text = r#"{ "directory_match": "substring", "max_nesting_depth": 2 }"#;
        let opts = TraversalOptions::from_json(text).unwrap();
        assert_eq!(opts.directory_match, DirectoryMatch::Substring);
        assert_eq!(opts.max_nesting_depth, 2);
        assert!(opts.sort_children);
        assert_eq!(opts.codec.password, None);
    }

    #[test]
    fn test_options_reject_bad_json() {
        let err = TraversalOptions::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Options(_)));
    }

    #[test]
    fn test_options_file_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("options.json");
        let opts = TraversalOptions {
            max_nested_archive_bytes: 1024,
            ..Default::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&opts).unwrap()).unwrap();

        assert_eq!(TraversalOptions::from_json_file(&path).unwrap(), opts);
        assert!(TraversalOptions::from_json_file(dir.path().join("missing.json"))
            .unwrap_err()
            .is_not_found());
    }
}
