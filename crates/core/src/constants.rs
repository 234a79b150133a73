//! Constants used throughout the MediaBatch core crate.
//!
//! Defaults for configuration, archive names and scratch file extensions live here so the HTTP
//! layer and the workflows agree on them.

/// Directory created under the system temp dir when no scratch directory is configured.
pub const DEFAULT_SCRATCH_DIR_NAME: &str = "mediabatch";

/// Media program used when none is configured.
pub const DEFAULT_FFMPEG_PROGRAM: &str = "ffmpeg";

/// Upper bound on one encode, in seconds.
pub const DEFAULT_MEDIA_TIMEOUT_SECS: u64 = 600;

/// Container extension of merged outputs.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "mp4";

/// Request body limit (1 GiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

/// Scratch extension for an uploaded video whose own extension is unusable.
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

/// Scratch extension for an uploaded audio file whose own extension is unusable.
pub const DEFAULT_AUDIO_EXTENSION: &str = "mp3";

/// First index used when the base name does not end in digits.
pub const DEFAULT_START_INDEX: &str = "1";

/// Download name of the audio-replace archive.
pub const MERGED_ARCHIVE_NAME: &str = "merged_videos.zip";

/// Suffix appended to the sanitised prefix for the rename archive.
pub const RENAMED_ARCHIVE_SUFFIX: &str = "_renamed.zip";

/// Stem used for the rename archive when the prefix is empty or sanitises to nothing.
pub const RENAMED_FALLBACK_STEM: &str = "renamed";
