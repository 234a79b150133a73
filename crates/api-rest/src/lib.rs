//! # API REST
//!
//! REST API implementation for MediaBatch.
//!
//! Handles:
//! - HTTP endpoints with axum (`/api/rename`, `/api/replace-audio`, `/health`)
//! - Multipart upload extraction
//! - Mapping core errors to JSON error responses
//! - REST-specific concerns (OpenAPI document, CORS, request tracing, body limits)
//!
//! Uses `api-shared` for response types and `mediabatch-core` for the workflows.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;
mod multipart;

use api_shared::{ErrorRes, HealthRes, RenameForm, ReplaceAudioForm};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use mediabatch_core::AudioReplaceService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use error::ApiError;

/// Application state shared by all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    audio_service: AudioReplaceService,
}

impl AppState {
    pub fn new(audio_service: AudioReplaceService) -> Self {
        Self { audio_service }
    }

    pub fn audio_service(&self) -> &AudioReplaceService {
        &self.audio_service
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::rename_files, handlers::replace_audio),
    components(schemas(HealthRes, ErrorRes, RenameForm, ReplaceAudioForm))
)]
pub struct ApiDoc;

/// Builds the full application router.
///
/// `max_upload_bytes` caps the size of a whole request body.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api-docs/openapi.json", get(handlers::openapi_json))
        .route("/api/rename", post(handlers::rename_files))
        .route("/api/replace-audio", post(handlers::replace_audio))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
