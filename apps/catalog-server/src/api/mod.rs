//! API endpoints.

pub mod films;
pub mod genres;
pub mod mpa;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
};
use catalog_store::CatalogStore;

use crate::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S: CatalogStore + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        // Film endpoints
        .route(
            "/films",
            get(films::list_films::<S>)
                .post(films::create_film::<S>)
                .put(films::update_film::<S>)
                .delete(films::delete_all_films::<S>),
        )
        .route("/films/popular", get(films::popular_films::<S>))
        .route("/films/:id", get(films::get_film::<S>).delete(films::delete_film::<S>))
        .route(
            "/films/:id/like/:user_id",
            put(films::add_like::<S>).delete(films::remove_like::<S>),
        )
        // User endpoints
        .route(
            "/users",
            get(users::list_users::<S>)
                .post(users::create_user::<S>)
                .put(users::update_user::<S>)
                .delete(users::delete_all_users::<S>),
        )
        .route("/users/:id", get(users::get_user::<S>).delete(users::delete_user::<S>))
        .route(
            "/users/:id/friends/:friend_id",
            put(users::add_friend::<S>).delete(users::delete_friend::<S>),
        )
        .route("/users/:id/friends", get(users::list_friends::<S>))
        .route(
            "/users/:id/friends/common/:other_id",
            get(users::common_friends::<S>),
        )
        // Lookup endpoints
        .route("/genres", get(genres::list_genres::<S>))
        .route("/genres/:id", get(genres::get_genre::<S>))
        .route("/mpa", get(mpa::list_mpa::<S>))
        .route("/mpa/:id", get(mpa::get_mpa::<S>))
        // Health check
        .route("/health", get(health_check))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
