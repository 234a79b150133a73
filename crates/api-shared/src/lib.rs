//! # API Shared
//!
//! Shared request and response types for the MediaBatch HTTP API.
//!
//! Contains:
//! - JSON response bodies (`HealthRes`, `ErrorRes`)
//! - OpenAPI schemas describing the multipart upload forms
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`; kept separate so other front ends can reuse the same shapes.

pub mod forms;
pub mod health;

pub use forms::{RenameForm, ReplaceAudioForm};
pub use health::HealthService;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error response body: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
