//! OpenAPI descriptions of the multipart upload forms.
//!
//! These types document the wire format only. The handlers read the multipart stream directly.

use utoipa::ToSchema;

/// `multipart/form-data` body of `POST /api/rename`.
#[derive(Debug, Clone, ToSchema)]
pub struct RenameForm {
    /// Files to rename, repeated once per file, in the order they should be numbered.
    #[schema(value_type = Vec<String>)]
    pub files: Vec<String>,
    /// Base name such as `img` or `img7`; trailing digits set the first number.
    #[schema(rename = "baseName")]
    pub base_name: String,
    /// `"true"` (default) keeps each file's extension; any other value drops it.
    #[schema(rename = "keepExtension")]
    pub keep_extension: Option<String>,
}

/// `multipart/form-data` body of `POST /api/replace-audio`.
#[derive(Debug, Clone, ToSchema)]
pub struct ReplaceAudioForm {
    /// Videos, repeated once per file.
    #[schema(value_type = Vec<String>)]
    pub videos: Vec<String>,
    /// Replacement audio, paired with `videos` by position.
    #[schema(value_type = Vec<String>)]
    pub audios: Vec<String>,
}
