#![cfg(feature = "sevenz")]

use anyhow::Result;
use arctree_codecs::{ArchiveFormat, Codecs, EntryStream};
use sevenz_rust::{SevenZArchiveEntry, SevenZWriter};
use std::io::Cursor;

/// Build a 7z in memory; every entry gets its own name, duplicates allowed.
fn build_7z(files: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut writer = SevenZWriter::new(Cursor::new(Vec::new()))?;
    for (name, content) in files {
        let mut entry = SevenZArchiveEntry::default();
        entry.name = name.to_string();
        entry.has_stream = true;
        writer.push_archive_entry(entry, Some(*content))?;
    }
    Ok(writer.finish()?.into_inner())
}

#[test]
fn test_sevenz_list_and_extract() -> Result<()> {
    let data = build_7z(&[("a.txt", b"alpha"), ("sub/b.txt", b"bravo"), ("empty.txt", b"")])?;

    let mut session = Codecs::default().open(None, EntryStream::from_bytes(data))?;
    assert_eq!(session.format(), ArchiveFormat::SevenZ);

    let entries = session.entries()?;
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["a.txt", "sub/b.txt", "empty.txt"]);
    assert_eq!(entries[1].parent_dir(), "sub");

    assert_eq!(Codecs::extract_to_vec(session.as_mut(), 1)?, b"bravo");
    assert_eq!(Codecs::extract_to_vec(session.as_mut(), 0)?, b"alpha");
    assert!(Codecs::extract_to_vec(session.as_mut(), 2)?.is_empty());

    Ok(())
}

#[test]
fn test_sevenz_duplicate_names_extract_by_index() -> Result<()> {
    let data = build_7z(&[("dup.txt", b"first"), ("dup.txt", b"second")])?;

    let stream = EntryStream::from_bytes(data);
    let mut session = Codecs::default().open(Some(ArchiveFormat::SevenZ), stream)?;
    let entries = session.entries()?;
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.name == "dup.txt"));

    assert_eq!(Codecs::extract_to_vec(session.as_mut(), 1)?, b"second");
    assert_eq!(Codecs::extract_to_vec(session.as_mut(), 0)?, b"first");

    Ok(())
}
