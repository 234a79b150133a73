//! MediaBatch scratch storage
//!
//! Uploaded payloads and encoder outputs are written to disk only for as long as one request needs
//! them. This crate owns that lifecycle.
//!
//! ## Design Principles
//!
//! - Every request gets its own namespace, named by a fresh [`RequestId`]
//! - Nothing outside a request's namespace is ever written or removed by that request
//! - Release is tied to ownership: dropping a guard removes what it owns, on success, on error
//!   and when the owning future is cancelled
//!
//! ## Layout
//!
//! ```text
//! <scratch_root>/
//! └── <request_id>/          # ScratchDir, removed when dropped
//!     ├── video_1.mp4        # PairScratch for index 1, removed when dropped
//!     ├── audio_1.mp3
//!     └── output_1.mp4
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use mediabatch_files::ScratchSpace;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let space = ScratchSpace::new(Path::new("/tmp/mediabatch"))?;
//! let dir = space.allocate()?;
//! let pair = dir.pair(1, "mp4", "mp3", "mp4")?;
//! assert!(pair.video().starts_with(dir.path()));
//! # Ok(())
//! # }
//! ```

mod scratch;

pub use mediabatch_uuid::RequestId;
pub use scratch::{is_safe_extension, PairScratch, ScratchDir, ScratchSpace};

/// Maximum number of fresh identifiers tried before allocation gives up.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Errors that can occur during scratch storage operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root directory could not be created or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Path validation failed (unsafe extension, or a path outside the request namespace)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// No unused request namespace could be created
    #[error("failed to allocate scratch directory: {0}")]
    Allocation(std::io::Error),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
