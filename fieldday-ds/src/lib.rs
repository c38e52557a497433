//! fieldday-ds library — team submission data server
//!
//! Receives repeatable JSON submissions from disconnected field clients and
//! maintains one authoritative, queryable record per team over an embedded
//! SQLite store. The library surface exists so integration tests can drive
//! the engine and router directly.

pub mod api;
pub mod db;
pub mod engine;
pub mod error;
pub mod mediafs;
pub mod models;
pub mod pagination;
pub mod snapshot;

pub use crate::error::{ApiError, ApiResult};

use crate::mediafs::MediaStore;
use crate::snapshot::SnapshotStore;
use axum::Router;
use sqlx::SqlitePool;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Raw submission snapshot store (audit only)
    pub snapshots: SnapshotStore,
    /// Uploaded media file store
    pub media: MediaStore,
    /// Shared secret for the destructive admin wipe; empty disables the gate
    pub admin_secret: String,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        snapshots: SnapshotStore,
        media: MediaStore,
        admin_secret: String,
    ) -> Self {
        Self {
            db,
            snapshots,
            media,
            admin_secret,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/api/submit", post(api::submit::submit))
        .route("/api/teams", get(api::teams::list_teams))
        .route("/api/team/:team_id", get(api::teams::get_team))
        .route(
            "/api/team/:team_id/evaluation",
            get(api::evaluations::get_evaluation).post(api::evaluations::save_evaluation),
        )
        .route(
            "/api/evaluation/teams",
            get(api::evaluations::evaluation_teams),
        )
        .route(
            "/api/team/:team_id/media/:filename",
            get(api::media::download_media).post(api::media::upload_media),
        )
        .route("/api/admin/clear", post(api::admin::clear_all))
        .route("/api/statistics", get(api::admin::statistics))
        .route("/api/status", get(api::admin::status))
        .route("/health", get(api::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
