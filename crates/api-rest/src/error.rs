//! Conversion of failures into JSON error responses.

use api_shared::ErrorRes;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use mediabatch_core::BatchError;

/// An error ready to be sent to the client as `{"error": <message>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<BatchError> for ApiError {
    /// Validation errors become 400 with their message; everything else is logged and becomes a
    /// 500 that does not leak paths or tool output.
    fn from(err: BatchError) -> Self {
        if err.is_validation() {
            return Self::bad_request(err.to_string());
        }

        tracing::error!("request failed: {:?}", err);
        match err {
            BatchError::MediaProcessing { index, .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Media processing failed for pair {index}"),
            ),
            _ => Self::internal(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorRes::new(self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediabatch_core::MediaError;

    #[test]
    fn test_validation_error_is_bad_request_with_message() {
        let err = ApiError::from(BatchError::InvalidInput("Missing files or baseName".into()));

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Missing files or baseName");
    }

    #[test]
    fn test_media_error_names_pair_without_tool_output() {
        let err = ApiError::from(BatchError::MediaProcessing {
            index: 3,
            source: MediaError::Failed {
                program: "/opt/ffmpeg".into(),
                code: Some(1),
                stderr: "/tmp/secret/audio_3.mp3: Invalid data".into(),
            },
        });

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Media processing failed for pair 3");
    }

    #[test]
    fn test_archive_error_is_generic_internal() {
        let err = ApiError::from(BatchError::DuplicateEntryName("a".into()));

        assert_eq!(err, ApiError::internal());
    }
}
