//! MPA rating lookup endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use catalog_store::CatalogStore;
use entities::Mpa;

use crate::error::ServerResult;
use crate::state::AppState;

/// Lists MPA ratings.
pub async fn list_mpa<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<Mpa>>> {
    Ok(Json(state.store.list_mpa().await?))
}

/// Gets an MPA rating by ID.
pub async fn get_mpa<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i32>,
) -> ServerResult<Json<Mpa>> {
    Ok(Json(state.store.get_mpa(id).await?))
}
