//! Film catalogue server
//!
//! Serves films, users, likes, friendships and the genre and MPA lookup
//! tables over a JSON REST interface.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::Router;
use catalog_store::CatalogStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the application router with all routes configured.
pub fn create_app<S: CatalogStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::create_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Wraps the store and its services in shared application state.
pub fn create_state<S: CatalogStore>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
