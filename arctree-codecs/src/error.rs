use std::io;

use thiserror::Error;

use crate::format::ArchiveFormat;

pub type Result<T> = std::result::Result<T, CodecError>;

/// Failures raised by an archive backend while opening, listing or extracting.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[cfg(feature = "sevenz")]
    #[error("7z error: {0}")]
    SevenZ(#[from] sevenz_rust::Error),

    #[error("{0} support is not compiled in")]
    Unsupported(ArchiveFormat),

    #[error("stream is not a recognized archive")]
    Unrecognized,

    #[error("entry index {0} is out of range")]
    EntryOutOfRange(usize),
}
