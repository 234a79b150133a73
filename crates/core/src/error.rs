use crate::media::MediaError;

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Missing or inconsistent request input. The message is shown to the client as-is.
    #[error("{0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("duplicate archive entry name: {0}")]
    DuplicateEntryName(String),
    #[error("invalid archive entry name: '{0}'")]
    InvalidEntryName(String),
    #[error("failed to write archive: {0}")]
    ArchiveWrite(zip::result::ZipError),
    #[error("failed to write archive entry: {0}")]
    ArchiveIo(std::io::Error),

    #[error("media processing failed for pair {index}: {source}")]
    MediaProcessing {
        index: usize,
        #[source]
        source: MediaError,
    },

    #[error("scratch storage error: {0}")]
    Scratch(#[from] mediabatch_files::FilesError),
}

impl BatchError {
    /// True for errors caused by the request itself rather than by the server.
    pub fn is_validation(&self) -> bool {
        matches!(self, BatchError::InvalidInput(_))
    }
}

pub type BatchResult<T> = std::result::Result<T, BatchError>;
