use std::io::{self, Write};

use zip::ZipArchive;

use crate::error::{CodecError, Result};
use crate::format::ArchiveFormat;
use crate::session::{ArchiveEntry, ArchiveSession};
use crate::stream::EntryStream;

/// Zip backend over the `zip` crate.
pub struct ZipSession {
    archive: ZipArchive<EntryStream>,
    password: Option<Vec<u8>>,
}

impl ZipSession {
    pub fn open(stream: EntryStream, password: Option<&str>) -> Result<Self> {
        let archive = ZipArchive::new(stream)?;
        Ok(Self {
            archive,
            password: password.map(|p| p.as_bytes().to_vec()),
        })
    }
}

impl ArchiveSession for ZipSession {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn entries(&mut self) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::with_capacity(self.archive.len());

        for index in 0..self.archive.len() {
            // Raw access reads only the header, so encrypted entries still list.
            let file = self.archive.by_index_raw(index)?;
            entries.push(ArchiveEntry::new(index, file.name(), file.is_dir(), file.size()));
        }

        Ok(entries)
    }

    fn extract(&mut self, index: usize, writer: &mut dyn Write) -> Result<u64> {
        if index >= self.archive.len() {
            return Err(CodecError::EntryOutOfRange(index));
        }

        let mut file = match self.password.as_deref() {
            Some(password) => self.archive.by_index_decrypt(index, password)?,
            None => self.archive.by_index(index)?,
        };

        Ok(io::copy(&mut file, writer)?)
    }
}
