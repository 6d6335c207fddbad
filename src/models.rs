use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A shortened URL record from the `short_urls` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShortLinkRecord {
    pub original_url: String,
    pub short_code: String,
    pub created_at: NaiveDateTime,
}

// ── API payloads ───────────────────────────────────────────────────────────

/// Body of `POST /api/shorturl`, accepted as a form or as JSON.
#[derive(Debug, Default, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Successful response of `POST /api/shorturl`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortUrlResponse {
    pub original_url: String,
    pub short_url: String,
}

impl From<ShortLinkRecord> for ShortUrlResponse {
    fn from(record: ShortLinkRecord) -> Self {
        Self {
            original_url: record.original_url,
            short_url: record.short_code,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GreetingResponse {
    pub greeting: String,
}
