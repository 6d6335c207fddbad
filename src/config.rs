use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::generator::{DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH, MIN_CODE_LENGTH};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string, e.g. "sqlite:./urlshort.db"
    pub database_url: String,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Length of newly generated short codes, clamped to 4..=32
    pub short_code_length: usize,

    /// Directory served under /public
    pub static_dir: PathBuf,

    /// Landing page served at "/"
    pub index_page: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup, so parsing can be
    /// exercised without touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .context("DATABASE_URL must be set in the environment or .env file")?;

        if database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL must not be empty");
        }

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let short_code_length = lookup("SHORT_CODE_LENGTH")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CODE_LENGTH)
            .clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH);

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            short_code_length,
            static_dir: lookup("STATIC_DIR")
                .unwrap_or_else(|| "public".into())
                .into(),
            index_page: lookup("INDEX_PAGE")
                .unwrap_or_else(|| "views/index.html".into())
                .into(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
