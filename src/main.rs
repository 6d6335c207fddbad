use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use urlshort::{
    config::AppConfig, db, generator::RandomTokenGenerator, store::ShortLinkStore, AppState,
};

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent; env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "urlshort=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    tracing::info!("Starting urlshort on {}", config.bind_addr());

    // The pool connects on demand; a database that is down at startup is
    // reported below but does not keep the server from listening.
    let pool = db::lazy_pool(&config.database_url)
        .with_context(|| format!("invalid DATABASE_URL '{}'", config.database_url))?;

    let migrate_pool = pool.clone();
    tokio::spawn(async move {
        db::migrate_until_ready(
            &migrate_pool,
            Duration::from_secs(1),
            Duration::from_secs(30),
        )
        .await
    });

    let store = ShortLinkStore::new(
        db::SqliteRepository::new(pool),
        RandomTokenGenerator::new(config.short_code_length),
    );

    let state = Arc::new(AppState { store, config });

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(state.config.bind_addr()).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, urlshort::router(state)).await?;

    Ok(())
}
