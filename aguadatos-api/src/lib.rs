//! aguadatos-api library - HTTP surface for plant record keeping
//!
//! Exposes the router and application state for the binary and for
//! integration tests.

use aguadatos_common::PlantRegistry;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod response;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Plant/configuration/user operations over the database pool
    pub registry: PlantRegistry,
}

impl AppState {
    /// Create new application state over an initialized pool
    pub fn new(db: SqlitePool) -> Self {
        Self {
            registry: PlantRegistry::new(db),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::plant_routes())
        .merge(api::user_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
