use std::sync::Arc;

use crate::{
    error::{Result, StoreError},
    generator::TokenGenerator,
    models::ShortLinkRecord,
    repository::LinkRepository,
};

/// How many codes are tried before giving up on a collision streak.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Idempotent URL → short code mapping over an injected repository and
/// code generator.
///
/// Cloning is cheap; clones share the same repository and generator.
#[derive(Clone)]
pub struct ShortLinkStore {
    repository: Arc<dyn LinkRepository>,
    generator: Arc<dyn TokenGenerator>,
}

impl ShortLinkStore {
    pub fn new(repository: impl LinkRepository, generator: impl TokenGenerator) -> Self {
        Self::from_shared(Arc::new(repository), Arc::new(generator))
    }

    /// Build a store over handles the caller keeps a reference to.
    pub fn from_shared(
        repository: Arc<dyn LinkRepository>,
        generator: Arc<dyn TokenGenerator>,
    ) -> Self {
        Self {
            repository,
            generator,
        }
    }

    /// Return the record for `url`, creating it on first use.
    ///
    /// 1. An existing record for `url` is returned unchanged.
    /// 2. Otherwise a fresh code is generated and the mapping inserted.
    /// 3. If the insert conflicts, either another request stored `url`
    ///    first (its record is returned) or the code collided (a new code is
    ///    drawn, up to [`MAX_CODE_ATTEMPTS`] in total).
    pub async fn get_or_create(&self, url: &str) -> Result<ShortLinkRecord> {
        if let Some(existing) = self.repository.find_by_original_url(url).await? {
            tracing::debug!(short_code = %existing.short_code, "Reusing short code for {}", url);
            return Ok(existing);
        }

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let short_code = self.generator.generate();

            match self.repository.insert(url, &short_code).await {
                Ok(record) => {
                    tracing::info!(short_code = %record.short_code, "Created short URL for {}", url);
                    return Ok(record);
                }
                Err(StoreError::Conflict) => {
                    if let Some(existing) = self.repository.find_by_original_url(url).await? {
                        tracing::debug!(
                            short_code = %existing.short_code,
                            "Concurrent request stored {} first",
                            url
                        );
                        return Ok(existing);
                    }
                    tracing::warn!(attempt, "Short code '{}' already taken, retrying", short_code);
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::CodesExhausted(MAX_CODE_ATTEMPTS))
    }

    /// Look up the record issued under `code`.
    pub async fn resolve(&self, code: &str) -> Result<ShortLinkRecord> {
        self.repository
            .find_by_short_code(code)
            .await?
            .ok_or_else(|| StoreError::NotFound(code.to_owned()))
    }
}
