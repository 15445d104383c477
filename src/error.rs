//! Application error types and handling.
//!
//! Every error renders as `{"error": <message>, "code": <code>}`. The
//! message is safe to show to clients; the underlying cause is only logged.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::storage::StorageError;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Error type/code.
    pub code: &'static str,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Upload request without a file part.
    #[error("No file uploaded")]
    MissingPayload,

    /// Bad request.
    #[error("{0}")]
    BadRequest(String),

    /// An album folder could not be listed.
    #[error("Unable to access folder")]
    FolderUnavailable(#[source] StorageError),

    /// The songs root could not be listed.
    #[error("Unable to fetch albums")]
    AlbumsUnavailable(#[source] StorageError),

    /// The upload could not be written to disk.
    #[error("Error saving file")]
    StagingFailed(#[source] StorageError),

    /// The staged upload could not be moved to its final name.
    #[error("Error renaming file")]
    RenameFailed(#[source] StorageError),

    /// Malformed multipart body. The parser's message is only logged.
    #[error("Malformed upload")]
    Multipart(#[from] actix_multipart::MultipartError),
}

impl AppError {
    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPayload => "MISSING_PAYLOAD",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::FolderUnavailable(_) | Self::AlbumsUnavailable(_) => "DIRECTORY_UNAVAILABLE",
            Self::StagingFailed(_) => "STAGING_FAILED",
            Self::RenameFailed(_) => "RENAME_FAILED",
            Self::Multipart(_) => "MALFORMED_UPLOAD",
        }
    }

    /// Create a bad request error for a name that cannot be used in a path.
    pub fn invalid_name(name: &str) -> Self {
        Self::BadRequest(format!("Invalid name: {:?}", name))
    }

    /// Map a listing failure of an album folder.
    pub fn folder_listing(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName(name) => Self::invalid_name(&name),
            other => Self::FolderUnavailable(other),
        }
    }

    /// Full cause chain, for server-side logs only.
    fn cause_chain(&self) -> String {
        let mut chain = Vec::new();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            chain.push(err.to_string());
            source = err.source();
        }
        chain.join(": ")
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName(name) => Self::invalid_name(&name),
            StorageError::DirectoryUnavailable { .. } => Self::FolderUnavailable(err),
            StorageError::StagingFailed { .. } => Self::StagingFailed(err),
            StorageError::RenameFailed { .. } => Self::RenameFailed(err),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingPayload | Self::BadRequest(_) | Self::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::FolderUnavailable(_)
            | Self::AlbumsUnavailable(_)
            | Self::StagingFailed(_)
            | Self::RenameFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = ErrorResponse::new(self.to_string(), self.error_code());

        if status.is_server_error() {
            tracing::error!(
                error_code = %self.error_code(),
                status = %status.as_u16(),
                cause = %self.cause_chain(),
                "API error"
            );
        } else {
            tracing::warn!(
                error_code = %self.error_code(),
                status = %status.as_u16(),
                message = %self,
                cause = %self.cause_chain(),
                "Rejected request"
            );
        }

        HttpResponse::build(status).json(error_response)
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
