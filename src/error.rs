use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tokio::task::JoinError;

use crate::models::ErrorResponse;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Failures of the short link store and its repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no short URL found for code {0:?}")]
    NotFound(String),

    /// A unique key (original URL or short code) is already taken.
    #[error("a record with the same original URL or short code already exists")]
    Conflict,

    #[error("no free short code found after {0} attempts")]
    CodesExhausted(usize),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

// ── Handler boundary ───────────────────────────────────────────────────────

/// Every failure a request handler can produce. Converted into the JSON
/// bodies clients see; nothing escapes past the handler.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid url")]
    InvalidUrl,

    #[error("No short URL found for the given input")]
    NotFound,

    #[error(transparent)]
    Store(StoreError),

    #[error("background task failed: {0}")]
    Task(#[from] JoinError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound,
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Validation and lookup misses are answered with 200, as clients of
        // this API expect.
        let (status, message) = match &self {
            AppError::InvalidUrl | AppError::NotFound => (StatusCode::OK, self.to_string()),
            AppError::Store(_) | AppError::Task(_) => {
                tracing::error!("Request failed: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server error".to_owned(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
