//! Error types for request handling and storage

use hyper::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for guestbook operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Everything that can fail while serving a single request
#[derive(Debug, Error)]
pub enum AppError {
    /// Store file missing, unreadable or unwritable
    #[error("Storage unavailable at {}: {}", .path.display(), .source)]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store file is not a JSON object of records
    #[error("Storage corrupt at {}: {}", .path.display(), .source)]
    StorageCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configured template file is absent
    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// A fixed page (index, message) could not be read
    #[error("Page unavailable: {}", .0.display())]
    PageUnavailable(PathBuf),

    /// Form body segment without `=`
    #[error("Malformed form body: segment '{0}' has no '='")]
    MalformedFormBody(String),

    #[error("Missing Content-Length header")]
    MissingContentLength,

    #[error("Invalid Content-Length value: '{0}'")]
    InvalidContentLength(String),

    #[error("Request body too large: {size} bytes (max: {limit})")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    /// Requested static path does not resolve to a file
    #[error("Static file not found: {0}")]
    StaticFileNotFound(String),
}

impl AppError {
    /// HTTP status reported to the client for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::StorageUnavailable { .. }
            | Self::StorageCorrupt { .. }
            | Self::TemplateNotFound(_)
            | Self::PageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MalformedFormBody(_) | Self::InvalidContentLength(_) | Self::BodyRead(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::MissingContentLength => StatusCode::LENGTH_REQUIRED,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::StaticFileNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Whether the failure is on the server side
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}
