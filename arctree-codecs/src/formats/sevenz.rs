use std::io::{self, Seek, SeekFrom, Write};
use std::ptr;

use sevenz_rust::{Password, SevenZArchiveEntry, SevenZReader};

use crate::error::{CodecError, Result};
use crate::format::ArchiveFormat;
use crate::session::{ArchiveEntry, ArchiveSession};
use crate::stream::EntryStream;

/// 7z backend over the `sevenz-rust` crate.
///
/// 7z folders are solid, so extracting one entry decodes the folder up to that entry.
pub struct SevenZSession {
    reader: SevenZReader<EntryStream>,
}

impl SevenZSession {
    pub fn open(mut stream: EntryStream, password: Option<&str>) -> Result<Self> {
        let len = stream.len()?;
        stream.seek(SeekFrom::Start(0))?;

        let password = password.map(Password::from).unwrap_or_else(Password::empty);
        let reader = SevenZReader::new(stream, len, password)?;
        Ok(Self { reader })
    }
}

impl ArchiveSession for SevenZSession {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::SevenZ
    }

    fn entries(&mut self) -> Result<Vec<ArchiveEntry>> {
        Ok(self
            .reader
            .archive()
            .files
            .iter()
            .enumerate()
            .map(|(index, file)| ArchiveEntry::new(index, &file.name, file.is_directory, file.size))
            .collect())
    }

    fn extract(&mut self, index: usize, writer: &mut dyn Write) -> Result<u64> {
        // Entries are yielded by reference into the archive's file table, in folder order
        // rather than index order, so the target is identified by address. Names may repeat.
        let target: *const SevenZArchiveEntry = self
            .reader
            .archive()
            .files
            .get(index)
            .ok_or(CodecError::EntryOutOfRange(index))?;

        let mut written = None;
        self.reader.for_each_entries(|entry, reader| {
            if !ptr::eq(entry, target) {
                io::copy(reader, &mut io::sink())?;
                return Ok(true);
            }
            written = Some(io::copy(reader, &mut *writer)?);
            Ok(false)
        })?;

        written.ok_or(CodecError::EntryOutOfRange(index))
    }
}
