use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};

use bytes::Bytes;

/// A readable, seekable byte stream handed to codecs and returned to node consumers.
///
/// `File` streams are fresh OS handles; `Memory` streams are cursors over immutable
/// shared bytes, so cloning the underlying buffer never copies.
#[derive(Debug)]
pub enum EntryStream {
    File(BufReader<File>),
    Memory(Cursor<Bytes>),
}

impl EntryStream {
    pub fn from_file(file: File) -> Self {
        Self::File(BufReader::new(file))
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Memory(Cursor::new(bytes.into()))
    }

    /// Total length of the stream; leaves the position untouched.
    pub fn len(&mut self) -> io::Result<u64> {
        match self {
            Self::Memory(cursor) => Ok(cursor.get_ref().len() as u64),
            Self::File(reader) => {
                let pos = reader.stream_position()?;
                let len = reader.seek(SeekFrom::End(0))?;
                reader.seek(SeekFrom::Start(pos))?;
                Ok(len)
            }
        }
    }
}

impl Read for EntryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(reader) => reader.read(buf),
            Self::Memory(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for EntryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::File(reader) => reader.seek(pos),
            Self::Memory(cursor) => cursor.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_stream_reads_and_rewinds() {
        let mut stream = EntryStream::from_bytes(&b"hello"[..]);
        assert_eq!(stream.len().unwrap(), 5);

        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello");

        stream.seek(SeekFrom::Start(1)).unwrap();
        let mut tail = String::new();
        stream.read_to_string(&mut tail).unwrap();
        assert_eq!(tail, "ello");
        assert_eq!(stream.len().unwrap(), 5);
    }
}
