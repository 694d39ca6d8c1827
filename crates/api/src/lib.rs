//! HTTP API layer with Axum routes over the ledger services.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - The acting-user extractor
//! - Mapping of ledger errors to JSON responses

pub mod error;
pub mod extractors;
pub mod routes;

use axum::Router;
use kasa_db::Ledger;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Every ledger service over one store.
    pub ledger: Ledger,
}

impl AppState {
    /// Wraps the ledger services.
    #[must_use]
    pub const fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
