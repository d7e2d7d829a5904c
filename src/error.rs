use std::io;
use thiserror::Error;

use crate::http::StatusCode;

/// Everything that can go wrong between reading a request and picking its file.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("no file matches the requested path")]
    NotFound,

    #[error("path escapes the served directory")]
    Forbidden,

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("unsupported method ({0})")]
    MethodNotImplemented(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ServeError {
    /// Classify a file-system error hit while resolving or opening a served file.
    pub fn from_fs(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ServeError::NotFound,
            _ => ServeError::Io(err),
        }
    }

    /// Traversal attempts answer like missing files so nothing outside the root is revealed.
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::NotFound | ServeError::Forbidden => StatusCode::NOT_FOUND,
            ServeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServeError::MethodNotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ServeError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
