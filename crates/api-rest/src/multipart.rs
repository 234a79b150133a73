//! Reading the multipart upload forms.
//!
//! File parts are only accepted when they carry a filename. A part with an empty filename and no
//! content is what browsers send for an untouched file input, so it is skipped. Unknown fields
//! are ignored.

use crate::ApiError;
use axum::extract::multipart::{Field, Multipart, MultipartError};
use mediabatch_core::UploadedFile;

/// Fields of a rename upload.
#[derive(Debug, Default)]
pub(crate) struct RenameFields {
    pub files: Vec<UploadedFile>,
    pub base_name: Option<String>,
    pub keep_extension: Option<String>,
}

impl RenameFields {
    /// `keepExtension` defaults to true; any value other than `true` (any case) means false.
    pub fn keep_extension(&self) -> bool {
        self.keep_extension
            .as_deref()
            .map_or(true, |value| value.eq_ignore_ascii_case("true"))
    }
}

/// Fields of an audio replacement upload.
#[derive(Debug, Default)]
pub(crate) struct AudioFields {
    pub videos: Vec<UploadedFile>,
    pub audios: Vec<UploadedFile>,
}

pub(crate) async fn read_rename_fields(mut multipart: Multipart) -> Result<RenameFields, ApiError> {
    let mut fields = RenameFields::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("files") => {
                if let Some(file) = read_file(field).await? {
                    fields.files.push(file);
                }
            }
            // First value wins for repeated text fields.
            Some("baseName") => {
                let text = field.text().await?;
                fields.base_name.get_or_insert(text);
            }
            Some("keepExtension") => {
                let text = field.text().await?;
                fields.keep_extension.get_or_insert(text);
            }
            _ => {}
        }
    }

    Ok(fields)
}

pub(crate) async fn read_audio_fields(mut multipart: Multipart) -> Result<AudioFields, ApiError> {
    let mut fields = AudioFields::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        let target = match name.as_deref() {
            Some("videos") => &mut fields.videos,
            Some("audios") => &mut fields.audios,
            _ => continue,
        };
        if let Some(file) = read_file(field).await? {
            target.push(file);
        }
    }

    Ok(fields)
}

async fn read_file(field: Field<'_>) -> Result<Option<UploadedFile>, MultipartError> {
    let Some(file_name) = field.file_name().map(str::to_owned) else {
        return Ok(None);
    };

    let content = field.bytes().await?;
    if file_name.is_empty() && content.is_empty() {
        return Ok(None);
    }

    Ok(Some(UploadedFile::new(file_name, content)))
}
