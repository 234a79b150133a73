//! HTTP handlers.

use crate::multipart::{read_audio_fields, read_rename_fields};
use crate::{ApiDoc, ApiError, AppState};
use api_shared::{ErrorRes, HealthRes, HealthService, RenameForm, ReplaceAudioForm};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use mediabatch_core::{rename_batch, AudioReplaceRequest, RenameRequest, MERGED_ARCHIVE_NAME};
use utoipa::OpenApi;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Used for monitoring and load balancer health checks.
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

/// Serves the OpenAPI document for this API.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    post,
    path = "/api/rename",
    request_body(content = RenameForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Zip archive of the renamed files"),
        (status = 400, description = "Missing files or baseName", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Bulk rename uploaded files
///
/// Names the uploads `<prefix><n>[.ext]` in upload order, counting up from the trailing number
/// of `baseName` (or 1), and returns them as `<prefix>_renamed.zip`.
pub async fn rename_files(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let fields = read_rename_fields(multipart?).await?;
    let keep_extension = fields.keep_extension();
    let request = RenameRequest {
        files: fields.files,
        base_name: fields.base_name.unwrap_or_default(),
        keep_extension,
    };

    // Compression is CPU bound; keep it off the async workers.
    let archive = tokio::task::spawn_blocking(move || rename_batch(request))
        .await
        .map_err(|e| {
            tracing::error!("Rename task failed: {:?}", e);
            ApiError::internal()
        })??;

    Ok(zip_response(&archive.download_name, archive.bytes))
}

#[utoipa::path(
    post,
    path = "/api/replace-audio",
    request_body(content = ReplaceAudioForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Zip archive of the merged videos"),
        (status = 400, description = "Missing or mismatched videos and audios", body = ErrorRes),
        (status = 500, description = "Media processing or internal error", body = ErrorRes)
    )
)]
/// Replace the audio track of uploaded videos
///
/// The i-th audio replaces the audio of the i-th video. Results are returned as
/// `merged_videos.zip` with entries `merged_<i>.<ext>`. Any failing pair fails the whole batch.
pub async fn replace_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let fields = read_audio_fields(multipart?).await?;
    let request = AudioReplaceRequest {
        videos: fields.videos,
        audios: fields.audios,
    };

    let bytes = state.audio_service().replace_audio_batch(request).await?;

    Ok(zip_response(MERGED_ARCHIVE_NAME, bytes))
}

fn zip_response(download_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/zip".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{download_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
