//! Genre lookup endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use catalog_store::CatalogStore;
use entities::Genre;

use crate::error::ServerResult;
use crate::state::AppState;

/// Lists genres.
pub async fn list_genres<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<Genre>>> {
    Ok(Json(state.store.list_genres().await?))
}

/// Gets a genre by ID.
pub async fn get_genre<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i32>,
) -> ServerResult<Json<Genre>> {
    Ok(Json(state.store.get_genre(id).await?))
}
