//! In-memory zip assembly.

use crate::{BatchError, BatchResult};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One file to place at the archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    pub name: String,
    pub content: Vec<u8>,
}

impl ZipEntry {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// Packs `entries` into a deflate-compressed zip archive, in the given order.
///
/// Every entry is written at the archive root. Names are checked before anything is written.
///
/// # Errors
///
/// - `BatchError::DuplicateEntryName` if two entries share a name.
/// - `BatchError::InvalidEntryName` if a name is empty or contains a path separator.
/// - `BatchError::ArchiveWrite` / `BatchError::ArchiveIo` if the zip writer fails.
pub fn build_zip(entries: &[ZipEntry]) -> BatchResult<Vec<u8>> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if entry.name.is_empty() || entry.name.contains(['/', '\\']) {
            return Err(BatchError::InvalidEntryName(entry.name.clone()));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(BatchError::DuplicateEntryName(entry.name.clone()));
        }
    }

    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in entries {
        writer
            .start_file(entry.name.as_str(), options)
            .map_err(BatchError::ArchiveWrite)?;
        writer
            .write_all(&entry.content)
            .map_err(BatchError::ArchiveIo)?;
    }

    let cursor = writer.finish().map_err(BatchError::ArchiveWrite)?;
    tracing::debug!(entries = entries.len(), bytes = cursor.get_ref().len(), "built zip archive");

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn extract(bytes: &[u8]) -> Vec<(String, Vec<u8>, CompressionMethod)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).expect("entry");
                let mut content = Vec::new();
                file.read_to_end(&mut content).expect("read entry");
                (file.name().to_owned(), content, file.compression())
            })
            .collect()
    }

    #[test]
    fn test_entries_in_input_order() {
        let entries = vec![
            ZipEntry::new("b.txt", b"second letter".to_vec()),
            ZipEntry::new("a.txt", b"first letter".to_vec()),
            ZipEntry::new("c.bin", vec![0, 1, 2, 3]),
        ];

        let bytes = build_zip(&entries).unwrap();
        let extracted = extract(&bytes);

        let names: Vec<_> = extracted.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "a.txt", "c.bin"]);
        assert_eq!(extracted[0].1, b"second letter");
        assert_eq!(extracted[2].1, vec![0, 1, 2, 3]);
        assert!(extracted
            .iter()
            .all(|(_, _, method)| *method == CompressionMethod::Deflated));
    }

    #[test]
    fn test_rebuild_extracts_identically() {
        let entries = vec![
            ZipEntry::new("merged_1.mp4", vec![7; 4096]),
            ZipEntry::new("merged_2.mp4", b"tiny".to_vec()),
        ];

        let first = extract(&build_zip(&entries).unwrap());
        let second = extract(&build_zip(&entries).unwrap());

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_content_entry() {
        let bytes = build_zip(&[ZipEntry::new("empty", Vec::new())]).unwrap();
        let extracted = extract(&bytes);

        assert_eq!(extracted.len(), 1);
        assert!(extracted[0].1.is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let entries = vec![
            ZipEntry::new("img1.png", b"a".to_vec()),
            ZipEntry::new("img1.png", b"b".to_vec()),
        ];

        let result = build_zip(&entries);

        assert!(matches!(result, Err(BatchError::DuplicateEntryName(name)) if name == "img1.png"));
    }

    #[test]
    fn test_nested_or_empty_names_rejected() {
        for bad in ["", "dir/file", "..\\evil"] {
            let result = build_zip(&[ZipEntry::new(bad, b"x".to_vec())]);
            assert!(
                matches!(result, Err(BatchError::InvalidEntryName(_))),
                "name {bad:?} should be rejected"
            );
        }
    }
}
