//! Scratch namespaces and their guards.
//!
//! [`ScratchSpace`] is created once at startup from configuration. Each request calls
//! [`ScratchSpace::allocate`] to obtain a [`ScratchDir`], and each unit of work inside the request
//! takes a [`PairScratch`] from that directory. Both guards delete what they own in `Drop`, so
//! cleanup runs on every exit path without the caller having to remember it.

use crate::{FilesError, RequestId, MAX_ALLOCATION_ATTEMPTS};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Longest file extension accepted for a scratch file.
const MAX_EXTENSION_LEN: usize = 16;

/// Root under which request namespaces are created.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    root: PathBuf,
}

impl ScratchSpace {
    /// Opens (creating if needed) the scratch root.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRootDirectory` if:
    /// - the path exists but is not a directory,
    /// - the directory cannot be created,
    /// - path canonicalisation fails.
    pub fn new(root: &Path) -> Result<Self, FilesError> {
        if root.exists() && !root.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }

        fs::create_dir_all(root).map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot create directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let root = root.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self { root })
    }

    /// Returns the canonicalised scratch root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates a fresh, empty namespace for one request.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Allocation` if no unused namespace could be created.
    pub fn allocate(&self) -> Result<ScratchDir, FilesError> {
        self.allocate_with(RequestId::new)
    }

    /// Creates a namespace using identifiers from `id_source`.
    ///
    /// An identifier whose directory already exists is skipped; at most
    /// [`MAX_ALLOCATION_ATTEMPTS`] identifiers are tried.
    pub(crate) fn allocate_with(
        &self,
        mut id_source: impl FnMut() -> RequestId,
    ) -> Result<ScratchDir, FilesError> {
        for _attempt in 0..MAX_ALLOCATION_ATTEMPTS {
            let id = id_source();
            let candidate = id.scratch_dir(&self.root);

            match fs::create_dir(&candidate) {
                Ok(()) => {
                    tracing::debug!(request_id = %id, path = %candidate.display(), "allocated scratch directory");
                    return Ok(ScratchDir {
                        id,
                        path: candidate,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(FilesError::Allocation(e)),
            }
        }

        Err(FilesError::Allocation(io::Error::new(
            ErrorKind::AlreadyExists,
            format!(
                "failed to allocate a unique scratch directory after {} attempts",
                MAX_ALLOCATION_ATTEMPTS
            ),
        )))
    }
}

/// A request's private scratch directory.
///
/// The directory and everything in it is removed when the guard is dropped.
#[derive(Debug)]
pub struct ScratchDir {
    id: RequestId,
    path: PathBuf,
}

impl ScratchDir {
    /// Identifier naming this namespace.
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Absolute path of the namespace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reserves the three paths used to process pair `index`.
    ///
    /// Paths are `video_{index}.{video_ext}`, `audio_{index}.{audio_ext}` and
    /// `output_{index}.{output_ext}`. Nothing is created on disk until the caller writes.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidPath` if an extension is empty, too long or not alphanumeric.
    pub fn pair(
        &self,
        index: usize,
        video_ext: &str,
        audio_ext: &str,
        output_ext: &str,
    ) -> Result<PairScratch, FilesError> {
        for ext in [video_ext, audio_ext, output_ext] {
            if !is_safe_extension(ext) {
                return Err(FilesError::InvalidPath(format!(
                    "unsafe scratch file extension: '{}'",
                    ext
                )));
            }
        }

        Ok(PairScratch {
            index,
            video: self.path.join(format!("video_{index}.{video_ext}")),
            audio: self.path.join(format!("audio_{index}.{audio_ext}")),
            output: self.path.join(format!("output_{index}.{output_ext}")),
        })
    }

    /// Writes `bytes` to `path`, which must lie inside this namespace.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidPath` for paths outside the namespace and `FilesError::Io` if
    /// the write fails.
    pub async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), FilesError> {
        self.ensure_contains(path)?;
        tokio::fs::write(path, bytes).await.map_err(|e| {
            FilesError::Io(io::Error::new(
                e.kind(),
                format!("Failed to write scratch file {}: {}", path.display(), e),
            ))
        })
    }

    /// Reads the whole of `path`, which must lie inside this namespace.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidPath` for paths outside the namespace and `FilesError::Io` if
    /// the file is missing or unreadable.
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, FilesError> {
        self.ensure_contains(path)?;
        tokio::fs::read(path).await.map_err(|e| {
            FilesError::Io(io::Error::new(
                e.kind(),
                format!("Failed to read scratch file {}: {}", path.display(), e),
            ))
        })
    }

    fn ensure_contains(&self, path: &Path) -> Result<(), FilesError> {
        let inside = path.parent() == Some(self.path.as_path());
        if !inside {
            return Err(FilesError::InvalidPath(format!(
                "{} is outside scratch directory {}",
                path.display(),
                self.path.display()
            )));
        }
        Ok(())
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => {
                tracing::debug!(request_id = %self.id, "removed scratch directory");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    request_id = %self.id,
                    path = %self.path.display(),
                    "failed to remove scratch directory: {}",
                    e
                );
            }
        }
    }
}

/// The scratch paths of one video/audio pair.
///
/// All three files are removed when the guard is dropped, whether or not they were created.
#[derive(Debug)]
pub struct PairScratch {
    index: usize,
    video: PathBuf,
    audio: PathBuf,
    output: PathBuf,
}

impl PairScratch {
    /// 1-based pair index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn video(&self) -> &Path {
        &self.video
    }

    pub fn audio(&self) -> &Path {
        &self.audio
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

impl Drop for PairScratch {
    fn drop(&mut self) {
        for path in [&self.video, &self.audio, &self.output] {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        index = self.index,
                        path = %path.display(),
                        "failed to remove scratch file: {}",
                        e
                    );
                }
            }
        }
    }
}

/// Returns true if `ext` (without the leading dot) can be used for a scratch file name.
///
/// Accepted extensions are 1 to 16 ASCII alphanumeric characters.
pub fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixed_id(hex: &str) -> RequestId {
        RequestId::parse(hex).expect("test id is canonical")
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("scratch").join("nested");

        let space = ScratchSpace::new(&root).unwrap();

        assert!(root.is_dir());
        assert_eq!(space.root(), root.canonicalize().unwrap());
    }

    #[test]
    fn test_new_rejects_file_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("file.txt");
        fs::write(&root, "not a directory").unwrap();

        let result = ScratchSpace::new(&root);

        assert!(matches!(result, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_allocate_creates_distinct_directories() {
        let temp = TempDir::new().unwrap();
        let space = ScratchSpace::new(temp.path()).unwrap();

        let first = space.allocate().unwrap();
        let second = space.allocate().unwrap();

        assert!(first.path().is_dir());
        assert!(second.path().is_dir());
        assert_ne!(first.path(), second.path());
        assert_eq!(first.path().parent(), Some(space.root()));
        assert!(first.path().ends_with(first.id().to_string()));
    }

    #[test]
    fn test_allocate_skips_existing_directory() {
        let temp = TempDir::new().unwrap();
        let space = ScratchSpace::new(temp.path()).unwrap();
        let taken = "00000000000000000000000000000001";
        let free = "00000000000000000000000000000002";
        fs::create_dir(space.root().join(taken)).unwrap();

        let mut ids = vec![fixed_id(free), fixed_id(taken)];
        let dir = space.allocate_with(|| ids.pop().unwrap()).unwrap();

        assert_eq!(dir.id().to_string(), free);
    }

    #[test]
    fn test_allocate_gives_up_after_max_attempts() {
        let temp = TempDir::new().unwrap();
        let space = ScratchSpace::new(temp.path()).unwrap();
        let taken = "00000000000000000000000000000003";
        fs::create_dir(space.root().join(taken)).unwrap();

        let mut calls = 0;
        let result = space.allocate_with(|| {
            calls += 1;
            fixed_id(taken)
        });

        assert!(matches!(result, Err(FilesError::Allocation(_))));
        assert_eq!(calls, MAX_ALLOCATION_ATTEMPTS);
    }

    #[test]
    fn test_drop_removes_directory_and_contents() {
        let temp = TempDir::new().unwrap();
        let space = ScratchSpace::new(temp.path()).unwrap();

        let dir = space.allocate().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(path.join("leftover.bin"), b"bytes").unwrap();
        drop(dir);

        assert!(!path.exists());
        assert_eq!(fs::read_dir(space.root()).unwrap().count(), 0);
    }

    #[test]
    fn test_pair_paths_are_indexed() {
        let temp = TempDir::new().unwrap();
        let space = ScratchSpace::new(temp.path()).unwrap();
        let dir = space.allocate().unwrap();

        let pair = dir.pair(3, "mov", "wav", "mp4").unwrap();

        assert_eq!(pair.index(), 3);
        assert_eq!(pair.video(), dir.path().join("video_3.mov"));
        assert_eq!(pair.audio(), dir.path().join("audio_3.wav"));
        assert_eq!(pair.output(), dir.path().join("output_3.mp4"));
    }

    #[test]
    fn test_pair_rejects_unsafe_extensions() {
        let temp = TempDir::new().unwrap();
        let space = ScratchSpace::new(temp.path()).unwrap();
        let dir = space.allocate().unwrap();

        for bad in ["", "../x", "mp4;rm", "a.b", "abcdefghijklmnopq"] {
            let result = dir.pair(1, bad, "mp3", "mp4");
            assert!(
                matches!(result, Err(FilesError::InvalidPath(_))),
                "extension {bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_pair_drop_removes_written_files() {
        let temp = TempDir::new().unwrap();
        let space = ScratchSpace::new(temp.path()).unwrap();
        let dir = space.allocate().unwrap();

        let pair = dir.pair(1, "mp4", "mp3", "mp4").unwrap();
        dir.write(pair.video(), b"video").await.unwrap();
        dir.write(pair.audio(), b"audio").await.unwrap();
        let (video, audio, output) = (
            pair.video().to_path_buf(),
            pair.audio().to_path_buf(),
            pair.output().to_path_buf(),
        );
        drop(pair);

        assert!(!video.exists());
        assert!(!audio.exists());
        assert!(!output.exists());
        assert!(dir.path().is_dir());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let space = ScratchSpace::new(temp.path()).unwrap();
        let dir = space.allocate().unwrap();
        let pair = dir.pair(2, "mp4", "mp3", "mp4").unwrap();

        dir.write(pair.output(), b"encoded").await.unwrap();
        let bytes = dir.read(pair.output()).await.unwrap();

        assert_eq!(bytes, b"encoded");
    }

    #[tokio::test]
    async fn test_write_outside_namespace_rejected() {
        let temp = TempDir::new().unwrap();
        let space = ScratchSpace::new(temp.path()).unwrap();
        let dir = space.allocate().unwrap();
        let outside = space.root().join("escape.bin");

        let result = dir.write(&outside, b"nope").await;

        assert!(matches!(result, Err(FilesError::InvalidPath(_))));
        assert!(!outside.exists());
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let space = ScratchSpace::new(temp.path()).unwrap();
        let dir = space.allocate().unwrap();
        let pair = dir.pair(1, "mp4", "mp3", "mp4").unwrap();

        let result = dir.read(pair.output()).await;

        assert!(matches!(result, Err(FilesError::Io(_))));
    }
}
