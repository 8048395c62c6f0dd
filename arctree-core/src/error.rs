use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use arctree_codecs::CodecError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Node variants, used to report which variant rejected an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    RealDirectory,
    RealFile,
    ArchiveContainer,
    ArchiveContent,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RealDirectory => "real directory",
            Self::RealFile => "real file",
            Self::ArchiveContainer => "archive container",
            Self::ArchiveContent => "archive content",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{op} is not supported for a {kind}")]
    Unsupported { op: &'static str, kind: NodeKind },

    #[error("codec failure on {name}: {source}")]
    Codec {
        name: String,
        #[source]
        source: CodecError,
    },

    #[error("archive {0} has been closed")]
    ResourceUnavailable(String),

    #[error("entry in {name} is larger than {limit} bytes")]
    LimitExceeded { name: String, limit: u64 },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn unsupported(op: &'static str, kind: NodeKind) -> Self {
        Self::Unsupported { op, kind }
    }

    pub(crate) fn codec(name: impl Into<String>, source: CodecError) -> Self {
        Self::Codec {
            name: name.into(),
            source,
        }
    }

    /// Wrap an I/O error, promoting `ErrorKind::NotFound` to [`Error::NotFound`].
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return Self::NotFound(path.to_path_buf());
        }
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    pub fn is_resource_unavailable(&self) -> bool {
        matches!(self, Self::ResourceUnavailable(_))
    }

    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, Self::LimitExceeded { .. })
    }
}
