//! Archive codec adapters for arctree.
//!
//! A codec turns a seekable byte stream into an [`ArchiveSession`]: a flat entry
//! listing plus per-entry extraction by index. Format is taken from the stream
//! signature when one is recognized, otherwise from the caller's name-derived hint.

pub mod error;
pub mod format;
pub mod formats;
pub mod session;
pub mod stream;

use serde::{Deserialize, Serialize};

pub use error::{CodecError, Result};
pub use format::{detect_format, ArchiveFormat};
pub use session::{ArchiveEntry, ArchiveSession};
pub use stream::EntryStream;

/// Settings handed to every session a [`Codecs`] instance opens.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Password for encrypted archives. Applied to every archive opened, nested ones included.
    pub password: Option<String>,
}

/// Entry point to the codec backends.
#[derive(Clone, Debug, Default)]
pub struct Codecs {
    opts: CodecOptions,
}

impl Codecs {
    pub fn new(opts: CodecOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.opts
    }

    /// Whether a backend for `format` is compiled in.
    pub fn supports(&self, format: ArchiveFormat) -> bool {
        match format {
            ArchiveFormat::Zip => true,
            ArchiveFormat::SevenZ => cfg!(feature = "sevenz"),
        }
    }

    /// Open `stream` as an archive. The session owns the stream until it is dropped.
    pub fn open(
        &self,
        hint: Option<ArchiveFormat>,
        mut stream: EntryStream,
    ) -> Result<Box<dyn ArchiveSession>> {
        let format = detect_format(&mut stream, hint)?.ok_or(CodecError::Unrecognized)?;
        let password = self.opts.password.as_deref();

        match format {
            ArchiveFormat::Zip => Ok(Box::new(formats::ZipSession::open(stream, password)?)),
            #[cfg(feature = "sevenz")]
            ArchiveFormat::SevenZ => Ok(Box::new(formats::SevenZSession::open(stream, password)?)),
            #[cfg(not(feature = "sevenz"))]
            ArchiveFormat::SevenZ => Err(CodecError::Unsupported(format)),
        }
    }

    /// Extract one entry into a fresh buffer.
    pub fn extract_to_vec(session: &mut dyn ArchiveSession, index: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        session.extract(index, &mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_unrecognized_stream() {
        let codecs = Codecs::default();
        let stream = EntryStream::from_bytes(&b"plain text, no archive here"[..]);
        assert!(matches!(codecs.open(None, stream), Err(CodecError::Unrecognized)));
    }

    #[test]
    fn test_open_with_hint_surfaces_codec_error() {
        let codecs = Codecs::default();
        let stream = EntryStream::from_bytes(&b"definitely not a zip"[..]);
        assert!(matches!(codecs.open(Some(ArchiveFormat::Zip), stream), Err(CodecError::Zip(_))));
    }
}
