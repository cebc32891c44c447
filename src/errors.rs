use axum::{http::StatusCode, Json};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raised when a caller opts into failing on protected paths.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Path '{path}' points to a dangerous system location")]
pub struct DangerousPathError {
    /// The path as the caller supplied it.
    pub path: String,
    /// Catalogue entry that matched, when one did.
    pub matched: Option<String>,
}

impl DangerousPathError {
    pub fn new(path: &Path, matched: Option<String>) -> Self {
        Self {
            path: path.display().to_string(),
            matched,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("cannot resolve '{}': {source}", path.display())]
    Unresolvable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("too many levels of symbolic links resolving '{}'", path.display())]
    SymlinkLoop { path: PathBuf },
}

/// Errors returned by the guard service.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("origin denied")]
    OriginDenied,
    #[error("request too large")]
    RequestTooLarge,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Dangerous(#[from] DangerousPathError),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "Unauthorized",
            AppError::OriginDenied => "OriginDenied",
            AppError::RequestTooLarge => "RequestTooLarge",
            AppError::BadRequest(_) => "BadRequest",
            AppError::Dangerous(_) => "DangerousPath",
            AppError::Internal(_) => "Internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::OriginDenied | AppError::Dangerous(_) => StatusCode::FORBIDDEN,
            AppError::RequestTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub fn into_response(err: AppError) -> (StatusCode, Json<ErrorBody>) {
    let body = ErrorBody {
        code: err.code(),
        message: err.to_string(),
    };
    (err.status(), Json(body))
}
