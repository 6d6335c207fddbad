use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    error::{Result, StoreError},
    models::ShortLinkRecord,
    repository::LinkRepository,
};

// ── Pool ───────────────────────────────────────────────────────────────────

/// Build the connection pool without connecting.
///
/// Connections are opened on first use, so an unreachable database never
/// blocks startup; callers see `sqlx::Error::PoolTimedOut` after five
/// seconds instead.
pub fn lazy_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        // CREATE the file if it doesn't exist yet
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    Ok(SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy_with(options))
}

/// Apply the embedded migrations (files in migrations/).
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Keep applying migrations until one run succeeds.
///
/// The wait between attempts starts at `backoff` and doubles up to
/// `max_backoff`. Every failure is logged; storage calls answer with
/// errors until this returns.
pub async fn migrate_until_ready(pool: &SqlitePool, mut backoff: Duration, max_backoff: Duration) {
    loop {
        match migrate(pool).await {
            Ok(()) => {
                tracing::info!("Database connection successful");
                return;
            }
            Err(e) => {
                tracing::error!("connection error: {}; retrying in {:?}", e, backoff);
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(max_backoff);
            }
        }
    }
}

// ── Repository ─────────────────────────────────────────────────────────────

/// [`LinkRepository`] backed by the `short_urls` table.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for SqliteRepository {
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortLinkRecord>> {
        let record: Option<ShortLinkRecord> = sqlx::query_as(
            "SELECT original_url, short_code, created_at
             FROM short_urls WHERE original_url = ?1",
        )
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_short_code(&self, short_code: &str) -> Result<Option<ShortLinkRecord>> {
        let record: Option<ShortLinkRecord> = sqlx::query_as(
            "SELECT original_url, short_code, created_at
             FROM short_urls WHERE short_code = ?1",
        )
        .bind(short_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn insert(&self, original_url: &str, short_code: &str) -> Result<ShortLinkRecord> {
        let id = sqlx::query("INSERT INTO short_urls (original_url, short_code) VALUES (?1, ?2)")
            .bind(original_url)
            .bind(short_code)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Conflict,
                other => StoreError::Storage(other),
            })?
            .last_insert_rowid();

        let record: ShortLinkRecord = sqlx::query_as(
            "SELECT original_url, short_code, created_at
             FROM short_urls WHERE id = ?1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `sqlite::memory:` is per connection, so the pool is pinned to one.
    async fn memory_repository() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrate(&pool).await.unwrap();
        SqliteRepository::new(pool)
    }

    #[tokio::test]
    async fn insert_and_find() {
        let repo = memory_repository().await;

        let created = repo
            .insert("https://www.example.com", "abc1234")
            .await
            .unwrap();
        assert_eq!(created.original_url, "https://www.example.com");
        assert_eq!(created.short_code, "abc1234");

        let by_url = repo
            .find_by_original_url("https://www.example.com")
            .await
            .unwrap();
        let by_code = repo.find_by_short_code("abc1234").await.unwrap();
        assert_eq!(by_url, Some(created.clone()));
        assert_eq!(by_code, Some(created));
    }

    #[tokio::test]
    async fn missing_rows_return_none() {
        let repo = memory_repository().await;

        assert!(repo.find_by_short_code("missing").await.unwrap().is_none());
        assert!(repo
            .find_by_original_url("https://missing.example")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unique_violations_become_conflicts() {
        let repo = memory_repository().await;
        repo.insert("https://a.example", "code1").await.unwrap();

        let same_code = repo.insert("https://b.example", "code1").await.unwrap_err();
        assert!(matches!(same_code, StoreError::Conflict));

        let same_url = repo.insert("https://a.example", "code2").await.unwrap_err();
        assert!(matches!(same_url, StoreError::Conflict));
    }

    #[tokio::test]
    async fn closed_pool_is_a_storage_error() {
        let repo = memory_repository().await;
        repo.pool.close().await;

        let err = repo.find_by_short_code("abc").await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }

    #[tokio::test]
    async fn lazy_pool_does_not_connect_eagerly() {
        let pool = lazy_pool("sqlite:///nonexistent-dir/urlshort.db").unwrap();
        assert_eq!(pool.size(), 0);
    }

    #[tokio::test]
    async fn migrations_are_retried_until_the_database_is_reachable() {
        let dir = tempfile::tempdir().unwrap();
        let db_dir = dir.path().join("created-later");
        let url = format!("sqlite://{}", db_dir.join("urlshort.db").display());

        let pool = lazy_pool(&url).unwrap();
        assert!(migrate(&pool).await.is_err());

        let migrating = tokio::spawn({
            let pool = pool.clone();
            async move {
                migrate_until_ready(&pool, Duration::from_millis(10), Duration::from_millis(50))
                    .await
            }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        std::fs::create_dir_all(&db_dir).unwrap();

        tokio::time::timeout(Duration::from_secs(30), migrating)
            .await
            .expect("migrations never succeeded")
            .unwrap();

        let repo = SqliteRepository::new(pool);
        let created = repo
            .insert("https://www.example.com", "late123")
            .await
            .unwrap();
        assert_eq!(
            repo.find_by_short_code("late123").await.unwrap(),
            Some(created)
        );
    }
}
