//! Bulk audio replacement.
//!
//! Videos and audio files are paired by position. Each pair is written to the request's scratch
//! directory, merged by the [`MediaPipeline`], read back and added to the result archive as
//! `merged_{i}.{ext}` (1-based).
//!
//! ## Failure policy
//!
//! The batch is all-or-nothing: the first pair that fails aborts the request and no partial
//! archive is produced.
//!
//! ## Scratch lifecycle
//!
//! ```text
//! <scratch_root>/<request_id>/      ScratchDir, dropped when the batch returns
//!     video_{i}.<ext>               \
//!     audio_{i}.<ext>                > PairScratch, dropped before pair i+1 starts
//!     output_{i}.<output_ext>       /
//! ```
//!
//! Both guards release on drop, so cleanup also happens when the request future is cancelled.

use crate::archive::{build_zip, ZipEntry};
use crate::config::CoreConfig;
use crate::constants::{DEFAULT_AUDIO_EXTENSION, DEFAULT_VIDEO_EXTENSION};
use crate::media::{FfmpegPipeline, MediaPipeline, MuxJob};
use crate::naming::file_extension;
use crate::{BatchError, BatchResult, UploadedFile};
use mediabatch_files::{is_safe_extension, ScratchDir, ScratchSpace};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Message returned when either list is empty.
pub const MISSING_AUDIO_INPUT: &str = "Missing videos or audios";

/// Message returned when the lists differ in length.
pub const AUDIO_COUNT_MISMATCH: &str = "Number of videos and audios must match";

/// Videos and replacement audio, paired by position.
#[derive(Debug, Clone)]
pub struct AudioReplaceRequest {
    pub videos: Vec<UploadedFile>,
    pub audios: Vec<UploadedFile>,
}

impl AudioReplaceRequest {
    /// Checks the pairing preconditions.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::InvalidInput` if either list is empty or the lengths differ.
    pub fn validate(&self) -> BatchResult<()> {
        if self.videos.is_empty() || self.audios.is_empty() {
            return Err(BatchError::InvalidInput(MISSING_AUDIO_INPUT.into()));
        }
        if self.videos.len() != self.audios.len() {
            return Err(BatchError::InvalidInput(AUDIO_COUNT_MISMATCH.into()));
        }
        Ok(())
    }
}

/// Runs audio replacement batches.
///
/// Cheap to clone; all clones share the configuration and the pipeline.
#[derive(Clone)]
pub struct AudioReplaceService {
    cfg: Arc<CoreConfig>,
    scratch: ScratchSpace,
    pipeline: Arc<dyn MediaPipeline>,
}

impl std::fmt::Debug for AudioReplaceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioReplaceService")
            .field("cfg", &self.cfg)
            .field("scratch", &self.scratch)
            .finish_non_exhaustive()
    }
}

impl AudioReplaceService {
    /// Creates the service and opens the configured scratch root.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::Scratch` if the scratch root cannot be created or used.
    pub fn new(cfg: Arc<CoreConfig>, pipeline: Arc<dyn MediaPipeline>) -> BatchResult<Self> {
        let scratch = ScratchSpace::new(cfg.scratch_dir())?;
        Ok(Self {
            cfg,
            scratch,
            pipeline,
        })
    }

    /// Creates the service with the `ffmpeg`-backed pipeline from `cfg`.
    ///
    /// # Errors
    ///
    /// See [`AudioReplaceService::new`].
    pub fn with_ffmpeg(cfg: Arc<CoreConfig>) -> BatchResult<Self> {
        let pipeline = Arc::new(FfmpegPipeline::from_config(&cfg));
        Self::new(cfg, pipeline)
    }

    pub fn scratch_root(&self) -> &std::path::Path {
        self.scratch.root()
    }

    /// Replaces the audio of every video and returns the zipped results.
    ///
    /// Validation happens before any scratch storage is touched.
    ///
    /// # Errors
    ///
    /// - `BatchError::InvalidInput` for empty or mismatched lists.
    /// - `BatchError::MediaProcessing` carrying the 1-based index of the first failing pair.
    /// - `BatchError::Scratch` for scratch storage failures.
    /// - Archive errors from [`build_zip`].
    pub async fn replace_audio_batch(&self, request: AudioReplaceRequest) -> BatchResult<Vec<u8>> {
        request.validate()?;

        let scratch = self.scratch.allocate()?;
        let span = tracing::info_span!(
            "replace_audio",
            request_id = %scratch.id(),
            pairs = request.videos.len()
        );

        let result: BatchResult<Vec<u8>> = async move {
            let started = Instant::now();
            let mut entries = Vec::with_capacity(request.videos.len());

            let pairs = request.videos.into_iter().zip(request.audios);
            for (offset, (video, audio)) in pairs.enumerate() {
                let entry = self.process_pair(&scratch, offset + 1, video, audio).await?;
                entries.push(entry);
            }

            drop(scratch);
            let archive = build_zip(&entries)?;

            tracing::info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                bytes = archive.len(),
                "audio replacement batch complete"
            );
            Ok(archive)
        }
        .instrument(span)
        .await;

        result
    }

    async fn process_pair(
        &self,
        scratch: &ScratchDir,
        index: usize,
        video: UploadedFile,
        audio: UploadedFile,
    ) -> BatchResult<ZipEntry> {
        let output_ext = self.cfg.output_extension();
        let pair = scratch.pair(
            index,
            &scratch_extension(&video.file_name, DEFAULT_VIDEO_EXTENSION),
            &scratch_extension(&audio.file_name, DEFAULT_AUDIO_EXTENSION),
            output_ext,
        )?;

        scratch.write(pair.video(), &video.content).await?;
        scratch.write(pair.audio(), &audio.content).await?;
        drop(video);
        drop(audio);

        let job = MuxJob {
            video: pair.video().to_path_buf(),
            audio: pair.audio().to_path_buf(),
            output: pair.output().to_path_buf(),
        };

        let started = Instant::now();
        if let Err(source) = self.pipeline.replace_audio(&job).await {
            tracing::warn!(index, "media processing failed: {}", source);
            return Err(BatchError::MediaProcessing { index, source });
        }

        let merged = scratch.read(pair.output()).await?;
        tracing::debug!(
            index,
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = merged.len(),
            "pair merged"
        );

        Ok(ZipEntry::new(format!("merged_{index}.{output_ext}"), merged))
    }
}

/// Lowercased extension of an uploaded file name, or `default` when it is missing or unsafe.
fn scratch_extension(file_name: &str, default: &str) -> String {
    let ext = file_extension(file_name)
        .trim_start_matches('.')
        .to_ascii_lowercase();
    if is_safe_extension(&ext) {
        ext
    } else {
        default.to_owned()
    }
}
