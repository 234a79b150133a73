//! Bulk rename workflow.
//!
//! Validates a rename request, derives the [`NamePolicy`], names every upload in order and packs
//! the renamed files into one archive together with a safe download name.

use crate::archive::{build_zip, ZipEntry};
use crate::constants::{RENAMED_ARCHIVE_SUFFIX, RENAMED_FALLBACK_STEM};
use crate::naming::NamePolicy;
use crate::{BatchError, BatchResult, UploadedFile};
use mediabatch_types::{secure_filename, NonEmptyText};

/// Message returned when the request has no files or no usable base name.
pub const MISSING_RENAME_INPUT: &str = "Missing files or baseName";

/// Files to rename, in upload order.
#[derive(Debug, Clone)]
pub struct RenameRequest {
    pub files: Vec<UploadedFile>,
    pub base_name: String,
    pub keep_extension: bool,
}

/// Result of a rename: the archive bytes and the name to offer for download.
#[derive(Debug, Clone)]
pub struct RenamedArchive {
    pub download_name: String,
    pub bytes: Vec<u8>,
}

/// Renames every upload sequentially and zips the result.
///
/// # Errors
///
/// - `BatchError::InvalidInput` if there are no files or the base name is blank.
/// - Archive errors from [`build_zip`].
///
/// Path separators in the base name are replaced with `_` so every entry stays at the archive
/// root.
pub fn rename_batch(request: RenameRequest) -> BatchResult<RenamedArchive> {
    let base_name = match NonEmptyText::new(&request.base_name) {
        Ok(base_name) if !request.files.is_empty() => base_name,
        _ => return Err(BatchError::InvalidInput(MISSING_RENAME_INPUT.into())),
    };

    let flat_base_name = base_name.as_str().replace(['/', '\\'], "_");
    let policy = NamePolicy::from_base_name(&flat_base_name);
    let original_names: Vec<&str> = request
        .files
        .iter()
        .map(|file| file.file_name.as_str())
        .collect();
    let entry_names = policy.generate_names(original_names.as_slice(), request.keep_extension);

    tracing::info!(
        files = request.files.len(),
        prefix = policy.prefix(),
        start_index = policy.start_index(),
        keep_extension = request.keep_extension,
        "renaming batch"
    );

    let entries: Vec<ZipEntry> = entry_names
        .into_iter()
        .zip(request.files)
        .map(|(name, file)| ZipEntry::new(name, file.content))
        .collect();

    let bytes = build_zip(&entries)?;

    Ok(RenamedArchive {
        download_name: download_name_for(policy.prefix()),
        bytes,
    })
}

/// `<sanitised prefix>_renamed.zip`, with `renamed` standing in for an empty prefix.
pub fn download_name_for(prefix: &str) -> String {
    let stem = secure_filename(prefix);
    let stem = if stem.is_empty() {
        RENAMED_FALLBACK_STEM.to_owned()
    } else {
        stem
    };
    format!("{stem}{RENAMED_ARCHIVE_SUFFIX}")
}
