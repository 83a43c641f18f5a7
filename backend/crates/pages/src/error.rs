//! Page Error Types
//!
//! Page-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Page-specific result type alias
pub type PageResult<T> = Result<T, PageError>;

/// Page-specific error variants
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Page not found!")]
    PageNotFound,

    #[error("You do not have permission to access the requested page!")]
    PermissionDenied,

    /// Structural actions on the root page are refused
    #[error("Action disabled!")]
    RootPageProtected,

    /// Form body could not be decoded
    #[error("Malformed form: {0}")]
    MalformedForm(String),

    /// Reorder/copy body could not be decoded
    #[error("Invalid position map: {0}")]
    InvalidPositionMap(String),

    /// Reorder/copy would break the tree
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Page {0} has not been deleted!")]
    NotDeleted(String),

    #[error("Template error: {0}")]
    Render(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PageError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PageError::PageNotFound => StatusCode::NOT_FOUND,
            PageError::PermissionDenied | PageError::RootPageProtected => StatusCode::FORBIDDEN,
            PageError::MalformedForm(_) | PageError::InvalidPositionMap(_) => {
                StatusCode::BAD_REQUEST
            }
            PageError::InvalidMove(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PageError::NotDeleted(_)
            | PageError::Render(_)
            | PageError::Database(_)
            | PageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PageError::PageNotFound => ErrorKind::NotFound,
            PageError::PermissionDenied | PageError::RootPageProtected => ErrorKind::Forbidden,
            PageError::MalformedForm(_) | PageError::InvalidPositionMap(_) => ErrorKind::BadRequest,
            PageError::InvalidMove(_) => ErrorKind::UnprocessableEntity,
            PageError::NotDeleted(_)
            | PageError::Render(_)
            | PageError::Database(_)
            | PageError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server faults keep their detail out of the response; it is logged instead.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        if kind.is_server_error() {
            AppError::new(kind, kind.as_str())
        } else {
            AppError::new(kind, self.to_string())
        }
    }

    pub(crate) fn log(&self) {
        match self {
            PageError::Database(e) => {
                tracing::error!(error = %e, "Page database error");
            }
            PageError::Render(msg) => {
                tracing::error!(message = %msg, "Page template error");
            }
            PageError::Internal(msg) => {
                tracing::error!(message = %msg, "Page internal error");
            }
            PageError::PermissionDenied => {
                tracing::warn!("Editor tried to access a protected page");
            }
            PageError::InvalidMove(reason) => {
                tracing::warn!(reason = %reason, "Rejected page move");
            }
            _ => {
                tracing::debug!(error = %self, "Page error");
            }
        }
    }
}

/// Errors that escape a handler answer with problem details
impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<minijinja::Error> for PageError {
    fn from(err: minijinja::Error) -> Self {
        PageError::Render(err.to_string())
    }
}

impl From<platform::form::FormError> for PageError {
    fn from(err: platform::form::FormError) -> Self {
        PageError::MalformedForm(err.to_string())
    }
}

impl From<serde_json::Error> for PageError {
    fn from(err: serde_json::Error) -> Self {
        PageError::Internal(format!("Flash payload: {err}"))
    }
}
