use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use arctree_codecs::{ArchiveEntry, ArchiveFormat, ArchiveSession, Codecs, EntryStream};
use bytes::Bytes;
use log::debug;
use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Shared reference to one open codec session.
///
/// Clones refer to the same session. The container that opened the handle is its
/// only owner and the only caller of `close`; every other holder just reads through
/// it. After `close`, listing and extraction fail with `Error::ResourceUnavailable`.
/// The session is also released when the last clone is dropped.
///
/// Extraction advances the codec's read position, so calls are serialized on an
/// internal lock.
#[derive(Clone)]
pub struct ArchiveHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    label: String,
    format: ArchiveFormat,
    session: Mutex<Option<Box<dyn ArchiveSession>>>,
}

impl ArchiveHandle {
    /// Open `stream` as an archive; `label` names it in logs and errors.
    pub fn open(
        label: impl Into<String>,
        hint: Option<ArchiveFormat>,
        stream: EntryStream,
        codecs: &Codecs,
    ) -> Result<Self> {
        let label = label.into();
        let session = codecs.open(hint, stream).map_err(|e| Error::codec(label.clone(), e))?;
        debug!("Opened {} archive {}", session.format(), label);

        Ok(Self {
            inner: Arc::new(HandleInner {
                label,
                format: session.format(),
                session: Mutex::new(Some(session)),
            }),
        })
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn format(&self) -> ArchiveFormat {
        self.inner.format
    }

    pub fn is_open(&self) -> bool {
        self.inner.session.lock().is_some()
    }

    /// True when both handles refer to the same session.
    pub fn same_session(&self, other: &ArchiveHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn entries(&self) -> Result<Vec<ArchiveEntry>> {
        self.with_session(|session| session.entries())
    }

    pub fn extract(&self, index: usize, writer: &mut dyn Write) -> Result<u64> {
        self.with_session(|session| session.extract(index, writer))
    }

    /// Extract one entry into a fresh, immutable buffer.
    pub fn extract_bytes(&self, index: usize) -> Result<Bytes> {
        let mut buf = Vec::new();
        self.extract(index, &mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Like [`extract_bytes`](Self::extract_bytes), but gives up with
    /// `Error::LimitExceeded` as soon as the output grows past `limit` bytes,
    /// whatever size the entry header claims.
    pub fn extract_bytes_capped(&self, index: usize, limit: u64) -> Result<Bytes> {
        let mut writer = CappedWriter::new(limit);
        match self.extract(index, &mut writer) {
            Ok(_) => Ok(Bytes::from(writer.buf)),
            Err(_) if writer.exceeded => Err(Error::LimitExceeded {
                name: self.inner.label.clone(),
                limit,
            }),
            Err(e) => Err(e),
        }
    }

    /// Release the session. Returns false if it was already closed.
    pub(crate) fn close(&self) -> bool {
        let closed = self.inner.session.lock().take().is_some();
        if closed {
            debug!("Closed archive {}", self.inner.label);
        }
        closed
    }

    fn with_session<T>(
        &self,
        f: impl FnOnce(&mut dyn ArchiveSession) -> arctree_codecs::Result<T>,
    ) -> Result<T> {
        let mut guard = self.inner.session.lock();
        let session = guard
            .as_mut()
            .ok_or_else(|| Error::ResourceUnavailable(self.inner.label.clone()))?;
        f(session.as_mut()).map_err(|e| Error::codec(self.inner.label.clone(), e))
    }
}

/// In-memory sink that refuses to grow past `limit`.
struct CappedWriter {
    buf: Vec<u8>,
    limit: u64,
    exceeded: bool,
}

impl CappedWriter {
    fn new(limit: u64) -> Self {
        Self {
            buf: Vec::new(),
            limit,
            exceeded: false,
        }
    }
}

impl Write for CappedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if (self.buf.len() + data.len()) as u64 > self.limit {
            self.exceeded = true;
            return Err(io::Error::other(format!("output exceeds {} bytes", self.limit)));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for ArchiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveHandle")
            .field("label", &self.inner.label)
            .field("format", &self.inner.format)
            .field("open", &self.is_open())
            .finish()
    }
}
