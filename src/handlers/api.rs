use crate::{
    error::AppError,
    models::{GreetingResponse, ShortUrlResponse, ShortenRequest},
    validator, AppState,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use std::{convert::Infallible, sync::Arc};

// ── Body extraction ────────────────────────────────────────────────────────

/// The shortening request, decoded from JSON when the client says so and
/// from an urlencoded form otherwise.
///
/// Never rejects: an unreadable body simply carries no URL, which the
/// handler reports as an invalid URL.
pub struct ShortenBody(pub ShortenRequest);

#[async_trait]
impl<S> FromRequest<S> for ShortenBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("json"));

        let body = if is_json {
            // A non-string `url` is treated like a missing one.
            Json::<serde_json::Value>::from_request(req, state)
                .await
                .ok()
                .map(|Json(value)| ShortenRequest {
                    url: value.get("url").and_then(|u| u.as_str()).map(str::to_owned),
                })
        } else {
            Form::<ShortenRequest>::from_request(req, state)
                .await
                .ok()
                .map(|Form(form)| form)
        };

        Ok(Self(body.unwrap_or_default()))
    }
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET /api/hello
pub async fn hello() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        greeting: "hello API".into(),
    })
}

/// POST /api/shorturl
///
/// 1. Reject anything that is not an http/https URI.
/// 2. Fetch the existing short code for the URL, or create one.
///
/// The store call runs on its own task so a client hanging up mid-request
/// does not abandon the write.
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    ShortenBody(body): ShortenBody,
) -> Result<Json<ShortUrlResponse>, AppError> {
    let url = match body.url {
        Some(url) if validator::is_web_uri(&url) => url,
        _ => return Err(AppError::InvalidUrl),
    };

    let store = state.store.clone();
    let record = tokio::spawn(async move { store.get_or_create(&url).await }).await??;

    Ok(Json(record.into()))
}
