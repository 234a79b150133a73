//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the core services.
//! Request handling never reads process-wide environment variables, so behaviour cannot change
//! between requests and tests stay independent of the environment.
//!
//! The `*_from_env_value` helpers take the raw `Option<String>` from `std::env::var(..).ok()` and
//! apply defaults, which keeps them testable without touching the real environment.

use crate::constants::{
    DEFAULT_FFMPEG_PROGRAM, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MEDIA_TIMEOUT_SECS,
    DEFAULT_OUTPUT_EXTENSION, DEFAULT_SCRATCH_DIR_NAME,
};
use crate::{BatchError, BatchResult};
use mediabatch_files::is_safe_extension;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    scratch_dir: PathBuf,
    ffmpeg_program: String,
    media_timeout: Duration,
    output_extension: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::InvalidConfig` if:
    /// - `ffmpeg_program` is empty,
    /// - `media_timeout` is zero,
    /// - `output_extension` is not 1 to 16 ASCII alphanumeric characters.
    pub fn new(
        scratch_dir: PathBuf,
        ffmpeg_program: String,
        media_timeout: Duration,
        output_extension: String,
    ) -> BatchResult<Self> {
        if ffmpeg_program.trim().is_empty() {
            return Err(BatchError::InvalidConfig(
                "ffmpeg program cannot be empty".into(),
            ));
        }

        if media_timeout.is_zero() {
            return Err(BatchError::InvalidConfig(
                "media timeout must be greater than zero".into(),
            ));
        }

        let output_extension = output_extension.trim().trim_start_matches('.').to_ascii_lowercase();
        if !is_safe_extension(&output_extension) {
            return Err(BatchError::InvalidConfig(format!(
                "output extension '{}' must be 1-16 ASCII alphanumeric characters",
                output_extension
            )));
        }

        Ok(Self {
            scratch_dir,
            ffmpeg_program,
            media_timeout,
            output_extension,
        })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn ffmpeg_program(&self) -> &str {
        &self.ffmpeg_program
    }

    pub fn media_timeout(&self) -> Duration {
        self.media_timeout
    }

    /// Extension of merged outputs, lowercase and without the leading dot.
    pub fn output_extension(&self) -> &str {
        &self.output_extension
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Scratch root from an optional value, defaulting to `<system temp>/mediabatch`.
pub fn scratch_dir_from_env_value(value: Option<String>) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_SCRATCH_DIR_NAME))
}

/// Media program from an optional value, defaulting to `ffmpeg` on `PATH`.
pub fn ffmpeg_program_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_FFMPEG_PROGRAM.into())
}

/// Output extension from an optional value, defaulting to `mp4`.
///
/// Validation happens in [`CoreConfig::new`].
pub fn output_extension_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_OUTPUT_EXTENSION.into())
}

/// Parse the media timeout (whole seconds) from an optional value.
///
/// # Errors
///
/// Returns `BatchError::InvalidConfig` if the value is not a non-negative integer.
pub fn media_timeout_from_env_value(value: Option<String>) -> BatchResult<Duration> {
    let secs = match non_blank(value) {
        Some(v) => v.parse::<u64>().map_err(|e| {
            BatchError::InvalidConfig(format!("invalid media timeout '{}': {}", v, e))
        })?,
        None => DEFAULT_MEDIA_TIMEOUT_SECS,
    };

    Ok(Duration::from_secs(secs))
}

/// Parse the request body limit (bytes) from an optional value.
///
/// # Errors
///
/// Returns `BatchError::InvalidConfig` if the value is not a positive integer.
pub fn max_upload_bytes_from_env_value(value: Option<String>) -> BatchResult<usize> {
    let Some(v) = non_blank(value) else {
        return Ok(DEFAULT_MAX_UPLOAD_BYTES);
    };

    match v.parse::<usize>() {
        Ok(0) => Err(BatchError::InvalidConfig(
            "max upload bytes must be greater than zero".into(),
        )),
        Ok(n) => Ok(n),
        Err(e) => Err(BatchError::InvalidConfig(format!(
            "invalid max upload bytes '{}': {}",
            v, e
        ))),
    }
}
