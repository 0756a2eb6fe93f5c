//! Catalog store trait definitions.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use entities::{Film, FriendStatus, Genre, Mpa, User};

use crate::CatalogStoreResult;

/// Trait for catalog storage operations.
///
/// Implementations own identifier assignment: `create_*` ignores the incoming
/// id and assigns the next value of a per-entity monotonic counter. Entities
/// returned from any read carry their associations (likes, genres, friendship
/// statuses) as currently recorded in the association tables.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Film operations
    // =========================================================================

    /// Creates a film together with its genres and likes.
    async fn create_film(&self, film: Film) -> CatalogStoreResult<Film>;

    /// Updates a film's fields and genres. Likes held by the store are kept.
    async fn update_film(&self, film: Film) -> CatalogStoreResult<Film>;

    /// Gets a film by ID.
    async fn get_film(&self, id: i64) -> CatalogStoreResult<Film>;

    /// Lists all films in creation order.
    async fn list_films(&self) -> CatalogStoreResult<Vec<Film>>;

    /// Deletes a film and its associations.
    async fn delete_film(&self, id: i64) -> CatalogStoreResult<()>;

    /// Deletes every film.
    async fn delete_all_films(&self) -> CatalogStoreResult<()>;

    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a user together with any supplied friendship statuses.
    async fn create_user(&self, user: User) -> CatalogStoreResult<User>;

    /// Updates a user's fields. Friendship statuses held by the store are kept.
    async fn update_user(&self, user: User) -> CatalogStoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: i64) -> CatalogStoreResult<User>;

    /// Lists all users in creation order.
    async fn list_users(&self) -> CatalogStoreResult<Vec<User>>;

    /// Deletes a user, their likes and every friendship involving them.
    async fn delete_user(&self, id: i64) -> CatalogStoreResult<()>;

    /// Deletes every user.
    async fn delete_all_users(&self) -> CatalogStoreResult<()>;

    // =========================================================================
    // Like operations
    // =========================================================================

    /// Records that a user likes a film. Adding the same like twice is a no-op.
    async fn add_like(&self, film_id: i64, user_id: i64) -> CatalogStoreResult<()>;

    /// Removes a like. Removing an absent like is a no-op.
    async fn remove_like(&self, film_id: i64, user_id: i64) -> CatalogStoreResult<()>;

    /// Lists the users who like a film.
    async fn likes(&self, film_id: i64) -> CatalogStoreResult<BTreeSet<i64>>;

    // =========================================================================
    // Genre operations
    // =========================================================================

    /// Replaces all genre links of a film.
    async fn replace_film_genres(
        &self,
        film_id: i64,
        genre_ids: &BTreeSet<i32>,
    ) -> CatalogStoreResult<()>;

    /// Lists a film's genres ordered by id.
    async fn film_genres(&self, film_id: i64) -> CatalogStoreResult<Vec<Genre>>;

    /// Lists all genres.
    async fn list_genres(&self) -> CatalogStoreResult<Vec<Genre>>;

    /// Gets a genre by ID.
    async fn get_genre(&self, id: i32) -> CatalogStoreResult<Genre>;

    // =========================================================================
    // MPA rating operations
    // =========================================================================

    /// Lists all MPA ratings.
    async fn list_mpa(&self) -> CatalogStoreResult<Vec<Mpa>>;

    /// Gets an MPA rating by ID.
    async fn get_mpa(&self, id: i32) -> CatalogStoreResult<Mpa>;

    // =========================================================================
    // Friendship operations
    // =========================================================================

    /// Sets the status of the directed friendship `user_id -> friend_id`.
    async fn set_friend_status(
        &self,
        user_id: i64,
        friend_id: i64,
        status: FriendStatus,
    ) -> CatalogStoreResult<()>;

    /// Removes the friendship between two users in both directions.
    async fn clear_friendship(&self, user_id: i64, friend_id: i64) -> CatalogStoreResult<()>;

    /// Returns the statuses of every friendship `user_id` initiated.
    async fn friend_statuses(&self, user_id: i64)
        -> CatalogStoreResult<BTreeMap<i64, FriendStatus>>;
}
