//! Media pipeline: replace the audio track of one video.
//!
//! The orchestrator only depends on the [`MediaPipeline`] trait. [`FfmpegPipeline`] is the
//! production implementation and runs an `ffmpeg` child process per job.

use crate::config::CoreConfig;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Most of ffmpeg's stderr kept on failure; the tail holds the actual error.
const MAX_STDERR_BYTES: usize = 4 * 1024;

/// Paths for one audio replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxJob {
    /// Source video; its own audio is discarded.
    pub video: PathBuf,
    /// Source of the new audio track.
    pub audio: PathBuf,
    /// Where the merged file is written. Its extension selects the container.
    pub output: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The tool ran and reported failure (unreadable input, codec error, ...).
    #[error("{program} exited unsuccessfully (code {code:?})")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("media encode timed out after {0:?}")]
    TimedOut(Duration),
    #[error("media encode produced no output at {0}")]
    MissingOutput(PathBuf),
}

/// Replaces the audio track of `job.video` with `job.audio`, writing `job.output`.
///
/// Implementations must leave the input files untouched and must not return `Ok` unless the
/// output file exists.
#[async_trait]
pub trait MediaPipeline: Send + Sync {
    async fn replace_audio(&self, job: &MuxJob) -> Result<(), MediaError>;
}

/// [`MediaPipeline`] backed by the `ffmpeg` command-line tool.
///
/// Output is H.264 video and AAC audio. The result keeps the video's duration: shorter audio is
/// padded with silence and longer audio is cut at the end of the video.
#[derive(Debug, Clone)]
pub struct FfmpegPipeline {
    program: String,
    timeout: Duration,
}

impl FfmpegPipeline {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.ffmpeg_program(), cfg.media_timeout())
    }

    /// Command-line arguments for `job`.
    pub fn arguments(job: &MuxJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-nostdin", "-y"]
            .into_iter()
            .map(OsString::from)
            .collect();

        args.push("-i".into());
        args.push(job.video.clone().into_os_string());
        args.push("-i".into());
        args.push(job.audio.clone().into_os_string());

        args.extend(
            [
                "-map", "0:v:0", "-map", "1:a:0", "-c:v", "libx264", "-c:a", "aac", "-af",
                "apad", "-shortest",
            ]
            .into_iter()
            .map(OsString::from),
        );

        args.push(job.output.clone().into_os_string());
        args
    }
}

#[async_trait]
impl MediaPipeline for FfmpegPipeline {
    async fn replace_audio(&self, job: &MuxJob) -> Result<(), MediaError> {
        let child = Command::new(&self.program)
            .args(Self::arguments(job))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| MediaError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Dropping `child` on timeout kills the process (kill_on_drop).
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| MediaError::Wait {
                program: self.program.clone(),
                source,
            })?,
            Err(_) => return Err(MediaError::TimedOut(self.timeout)),
        };

        if !output.status.success() {
            let stderr = stderr_tail(&output.stderr);
            tracing::debug!(program = %self.program, "media tool stderr: {}", stderr);
            return Err(MediaError::Failed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        match tokio::fs::metadata(&job.output).await {
            Ok(meta) if meta.is_file() => Ok(()),
            _ => Err(MediaError::MissingOutput(job.output.clone())),
        }
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(MAX_STDERR_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn job_in(dir: &TempDir) -> MuxJob {
        MuxJob {
            video: dir.path().join("video_1.mp4"),
            audio: dir.path().join("audio_1.mp3"),
            output: dir.path().join("output_1.mp4"),
        }
    }

    #[test]
    fn test_arguments_map_video_and_new_audio() {
        let job = MuxJob {
            video: PathBuf::from("/s/video_1.mov"),
            audio: PathBuf::from("/s/audio_1.wav"),
            output: PathBuf::from("/s/output_1.mp4"),
        };

        let args: Vec<String> = FfmpegPipeline::arguments(&job)
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect();

        let joined = args.join(" ");
        assert!(joined.contains("-i /s/video_1.mov -i /s/audio_1.wav"));
        assert!(joined.contains("-map 0:v:0 -map 1:a:0"));
        assert!(joined.contains("-c:v libx264 -c:a aac"));
        assert!(joined.contains("-af apad -shortest"));
        assert!(args.contains(&"-nostdin".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/s/output_1.mp4"));
    }

    #[test]
    fn test_stderr_tail_keeps_end() {
        let mut long = vec![b'a'; MAX_STDERR_BYTES];
        long.extend_from_slice(b"Invalid data found when processing input\n");

        let tail = stderr_tail(&long);

        assert!(tail.ends_with("Invalid data found when processing input"));
        assert!(tail.len() <= MAX_STDERR_BYTES);
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let pipeline = FfmpegPipeline::new(
            "mediabatch-definitely-not-installed",
            Duration::from_secs(5),
        );

        let result = pipeline.replace_audio(&job_in(&dir)).await;

        assert!(matches!(result, Err(MediaError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program_is_failed_error() {
        let dir = TempDir::new().unwrap();
        let pipeline = FfmpegPipeline::new("false", Duration::from_secs(5));

        let result = pipeline.replace_audio(&job_in(&dir)).await;

        match result {
            Err(MediaError::Failed { program, code, .. }) => {
                assert_eq!(program, "false");
                assert_eq!(code, Some(1));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_without_output_is_missing_output() {
        let dir = TempDir::new().unwrap();
        let pipeline = FfmpegPipeline::new("true", Duration::from_secs(5));
        let job = job_in(&dir);

        let result = pipeline.replace_audio(&job).await;

        assert!(matches!(result, Err(MediaError::MissingOutput(path)) if path == job.output));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_program_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let script = dir.path().join("slow-encoder.sh");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let timeout = Duration::from_millis(300);
        let pipeline = FfmpegPipeline::new(script.to_string_lossy(), timeout);
        let started = std::time::Instant::now();

        let result = pipeline.replace_audio(&job_in(&dir)).await;

        assert!(matches!(result, Err(MediaError::TimedOut(t)) if t == timeout));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
