//! # MediaBatch Core
//!
//! Core file-processing workflows behind the MediaBatch HTTP service:
//! - Sequential renaming of uploaded files and zipping of the result
//! - Replacing the audio track of uploaded videos and zipping the merged outputs
//!
//! **No API concerns**: multipart parsing, HTTP status codes and routing belong in `api-rest`.

pub mod archive;
pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod media;
pub mod naming;
pub mod rename;

pub use archive::{build_zip, ZipEntry};
pub use audio::{AudioReplaceRequest, AudioReplaceService};
pub use config::CoreConfig;
pub use constants::*;
pub use error::{BatchError, BatchResult};
pub use media::{FfmpegPipeline, MediaError, MediaPipeline, MuxJob};
pub use naming::{file_extension, generate_names, parse_base_and_start, NamePolicy};
pub use rename::{rename_batch, RenameRequest, RenamedArchive};

/// One uploaded file as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name as sent by the client; may contain a path and is never trusted.
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}
