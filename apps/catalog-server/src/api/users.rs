//! User API endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use catalog_store::CatalogStore;
use entities::{User, UserInput};

use crate::error::ServerResult;
use crate::state::AppState;

/// Creates a user.
pub async fn create_user<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<User>)> {
    let Json(input) = payload?;
    tracing::debug!(?input, "Create user requested");
    let user = state.users.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Updates a user.
pub async fn update_user<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> ServerResult<Json<User>> {
    let Json(input) = payload?;
    tracing::debug!(?input, "Update user requested");
    Ok(Json(state.users.update_user(input).await?))
}

/// Lists users.
pub async fn list_users<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<User>>> {
    Ok(Json(state.users.list_users().await?))
}

/// Gets a user by ID.
pub async fn get_user<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> ServerResult<Json<User>> {
    Ok(Json(state.users.get_user(id).await?))
}

/// Deletes a user.
pub async fn delete_user<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> ServerResult<StatusCode> {
    state.users.delete_user(id).await?;
    Ok(StatusCode::OK)
}

/// Deletes all users.
pub async fn delete_all_users<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<StatusCode> {
    state.users.delete_all_users().await?;
    Ok(StatusCode::OK)
}

/// Adds a friend.
pub async fn add_friend<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, friend_id)): Path<(i64, i64)>,
) -> ServerResult<StatusCode> {
    state.users.add_friend(id, friend_id).await?;
    Ok(StatusCode::OK)
}

/// Removes a friend.
pub async fn delete_friend<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, friend_id)): Path<(i64, i64)>,
) -> ServerResult<StatusCode> {
    state.users.delete_friend(id, friend_id).await?;
    Ok(StatusCode::OK)
}

/// Lists a user's friends.
pub async fn list_friends<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> ServerResult<Json<Vec<User>>> {
    Ok(Json(state.users.friends(id).await?))
}

/// Lists friends two users have in common.
pub async fn common_friends<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, other_id)): Path<(i64, i64)>,
) -> ServerResult<Json<Vec<User>>> {
    Ok(Json(state.users.common_friends(id, other_id).await?))
}
