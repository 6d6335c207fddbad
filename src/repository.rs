use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    error::{Result, StoreError},
    models::ShortLinkRecord,
};

/// The persistence collaborator behind [`crate::store::ShortLinkStore`].
///
/// Implementations must reject an insert whose original URL or short code is
/// already stored with [`StoreError::Conflict`].
#[async_trait]
pub trait LinkRepository: Send + Sync + 'static {
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortLinkRecord>>;

    async fn find_by_short_code(&self, short_code: &str) -> Result<Option<ShortLinkRecord>>;

    /// Insert a new mapping and return the stored row.
    async fn insert(&self, original_url: &str, short_code: &str) -> Result<ShortLinkRecord>;
}

// ── In-memory ──────────────────────────────────────────────────────────────

/// Repository held entirely in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    by_url: DashMap<String, ShortLinkRecord>,
    /// short_code -> original_url
    by_code: DashMap<String, String>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}

#[async_trait]
impl LinkRepository for InMemoryRepository {
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortLinkRecord>> {
        Ok(self.by_url.get(original_url).map(|r| r.clone()))
    }

    async fn find_by_short_code(&self, short_code: &str) -> Result<Option<ShortLinkRecord>> {
        let Some(original_url) = self.by_code.get(short_code).map(|u| u.clone()) else {
            return Ok(None);
        };
        self.find_by_original_url(&original_url).await
    }

    async fn insert(&self, original_url: &str, short_code: &str) -> Result<ShortLinkRecord> {
        // Reserve the code first, then claim the URL; release the code if
        // the URL turns out to be taken.
        match self.by_code.entry(short_code.to_owned()) {
            Entry::Occupied(_) => return Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(original_url.to_owned());
            }
        }

        let record = ShortLinkRecord {
            original_url: original_url.to_owned(),
            short_code: short_code.to_owned(),
            created_at: chrono::Utc::now().naive_utc(),
        };

        let claimed = match self.by_url.entry(original_url.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                true
            }
        };

        if !claimed {
            self.by_code.remove(short_code);
            return Err(StoreError::Conflict);
        }

        Ok(record)
    }
}
