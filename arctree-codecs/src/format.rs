use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Zip local file header signature.
const ZIP_LOCAL_HEADER: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// Zip end-of-central-directory signature (an archive with no entries starts here).
const ZIP_EMPTY_ARCHIVE: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
/// 7z signature header: "7z\xBC\xAF\x27\x1C".
const SEVENZ_SIGNATURE: [u8; 6] = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];

/// Longest signature we look for.
pub const SNIFF_LEN: usize = 6;

/// Archive formats routed to a codec backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchiveFormat {
    Zip,
    SevenZ,
}

impl ArchiveFormat {
    pub const ALL: [ArchiveFormat; 2] = [ArchiveFormat::Zip, ArchiveFormat::SevenZ];

    /// File extension (with the leading dot) recognized for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::SevenZ => ".7z",
        }
    }

    /// Detect by name suffix, ignoring ASCII case.
    ///
    /// Only the final path segment matters, so entry names like `sub/inner.ZIP` match.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim_end_matches(['/', '\\']);
        Self::ALL
            .into_iter()
            .find(|format| ends_with_ignore_ascii_case(name, format.extension()))
    }

    /// Detect from the first bytes of a stream.
    pub fn sniff(header: &[u8]) -> Option<Self> {
        if header.starts_with(&ZIP_LOCAL_HEADER) || header.starts_with(&ZIP_EMPTY_ARCHIVE) {
            return Some(Self::Zip);
        }
        if header.starts_with(&SEVENZ_SIGNATURE) {
            return Some(Self::SevenZ);
        }
        None
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => write!(f, "zip"),
            Self::SevenZ => write!(f, "7z"),
        }
    }
}

/// Detect the format of `stream`, preferring the signature over the name-derived `hint`.
///
/// The stream is rewound to its start before returning.
pub fn detect_format<R: Read + Seek>(
    stream: &mut R,
    hint: Option<ArchiveFormat>,
) -> Result<Option<ArchiveFormat>> {
    stream.seek(SeekFrom::Start(0))?;

    let mut header = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < header.len() {
        let n = stream.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    stream.seek(SeekFrom::Start(0))?;

    if let Some(format) = ArchiveFormat::sniff(&header[..filled]) {
        if hint.is_some_and(|h| h != format) {
            log::debug!(
                "Signature says {} but name says {:?}; trusting the signature",
                format,
                hint
            );
        }
        return Ok(Some(format));
    }

    Ok(hint)
}

fn ends_with_ignore_ascii_case(name: &str, suffix: &str) -> bool {
    let (name, suffix) = (name.as_bytes(), suffix.as_bytes());
    name.len() >= suffix.len() && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}
