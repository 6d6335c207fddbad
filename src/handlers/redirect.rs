use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /api/shorturl/:short_url
///
/// Answers 302 Found with the original URL in `Location`. Unknown codes get
/// the "No short URL found" error body.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(short_url): Path<String>,
) -> Result<Response, AppError> {
    let record = state.store.resolve(&short_url).await?;

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, record.original_url)],
    )
        .into_response())
}
