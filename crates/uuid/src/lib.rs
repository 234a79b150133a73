//! Request identifiers.
//!
//! Every request that touches the filesystem gets its own [`RequestId`]. The identifier names the
//! request's scratch namespace and tags its log lines, so concurrent requests never share a path.
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the value produced by `Uuid::new_v4().simple().to_string()`. Externally supplied
//! identifiers must already be canonical; see [`RequestId::parse`].
//!
//! ## Scratch layout
//! For a canonical id `u`, scratch data lives under `scratch_root/<u>/`.

mod service;

pub use service::RequestId;

/// Error type for request identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for request identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
