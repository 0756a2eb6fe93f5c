//! Film API endpoints.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use catalog_store::CatalogStore;
use entities::{Film, FilmInput};
use serde::Deserialize;

use crate::error::ServerResult;
use crate::state::AppState;

/// Number of films returned by `/films/popular` when `count` is omitted.
pub const DEFAULT_POPULAR_COUNT: i64 = 10;

/// Query parameters for the popular films endpoint.
#[derive(Debug, Deserialize)]
pub struct PopularParams {
    pub count: Option<i64>,
}

/// Creates a film.
pub async fn create_film<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<FilmInput>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Film>)> {
    let Json(input) = payload?;
    tracing::debug!(?input, "Create film requested");
    let film = state.films.create_film(input).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

/// Updates a film.
pub async fn update_film<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<FilmInput>, JsonRejection>,
) -> ServerResult<Json<Film>> {
    let Json(input) = payload?;
    tracing::debug!(?input, "Update film requested");
    Ok(Json(state.films.update_film(input).await?))
}

/// Lists films.
pub async fn list_films<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<Film>>> {
    Ok(Json(state.films.list_films().await?))
}

/// Gets a film by ID.
pub async fn get_film<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> ServerResult<Json<Film>> {
    Ok(Json(state.films.get_film(id).await?))
}

/// Deletes a film.
pub async fn delete_film<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> ServerResult<StatusCode> {
    state.films.delete_film(id).await?;
    Ok(StatusCode::OK)
}

/// Deletes all films.
pub async fn delete_all_films<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<StatusCode> {
    state.films.delete_all_films().await?;
    Ok(StatusCode::OK)
}

/// Likes a film on behalf of a user.
pub async fn add_like<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ServerResult<StatusCode> {
    state.films.add_like(id, user_id).await?;
    Ok(StatusCode::OK)
}

/// Withdraws a user's like.
pub async fn remove_like<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ServerResult<StatusCode> {
    state.films.remove_like(id, user_id).await?;
    Ok(StatusCode::OK)
}

/// Lists the most liked films. A negative `count` yields an empty list.
pub async fn popular_films<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    params: Result<Query<PopularParams>, QueryRejection>,
) -> ServerResult<Json<Vec<Film>>> {
    let Query(params) = params?;
    let count = params.count.unwrap_or(DEFAULT_POPULAR_COUNT);
    let count = usize::try_from(count).unwrap_or(0);

    Ok(Json(state.films.top_films(count).await?))
}
