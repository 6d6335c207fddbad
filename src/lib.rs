use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod store;
pub mod validator;

use config::AppConfig;
use store::ShortLinkStore;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub store: ShortLinkStore,
    pub config: AppConfig,
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/hello", get(handlers::api::hello))
        .route("/shorturl", post(handlers::api::shorten))
        .route("/shorturl/:short_url", get(handlers::redirect::redirect));

    Router::new()
        // Landing page
        .route_service("/", ServeFile::new(&state.config.index_page))
        .route("/health", get(|| async { StatusCode::OK }))
        .nest("/api", api_router)
        .nest_service("/public", ServeDir::new(&state.config.static_dir))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
