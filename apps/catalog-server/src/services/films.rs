//! Film aggregation service.

use std::sync::Arc;

use catalog_store::CatalogStore;
use entities::{EARLIEST_RELEASE_DATE, Film, FilmInput, Validate};

use crate::error::{ServerError, ServerResult};

/// Film operations that span the film, user and association tables.
#[derive(Debug)]
pub struct FilmService<S> {
    store: Arc<S>,
}

impl<S> Clone for FilmService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CatalogStore> FilmService<S> {
    /// Creates a new film service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validates and stores a new film.
    pub async fn create_film(&self, input: FilmInput) -> ServerResult<Film> {
        check_film(&input)?;

        let film = input.into_film();
        for user_id in &film.likes {
            self.store.get_user(*user_id).await?;
        }

        let film = self.store.create_film(film).await?;

        tracing::info!(film_id = film.id, name = %film.name, "Film created");

        Ok(film)
    }

    /// Validates and updates an existing film.
    ///
    /// Genres are replaced only when the payload carries them. Likes are never
    /// taken from the payload.
    pub async fn update_film(&self, input: FilmInput) -> ServerResult<Film> {
        check_film(&input)?;

        let id = input
            .id
            .ok_or_else(|| ServerError::InvalidRequest("film id must be specified".to_string()))?;
        let existing = self.store.get_film(id).await?;

        let keep_genres = input.genres.is_none();
        let mut film = input.into_film();
        if keep_genres {
            film.genres = existing.genres;
        }

        let film = self.store.update_film(film).await?;

        tracing::info!(film_id = film.id, "Film updated");

        Ok(film)
    }

    /// Gets a film by ID.
    pub async fn get_film(&self, id: i64) -> ServerResult<Film> {
        Ok(self.store.get_film(id).await?)
    }

    /// Lists all films.
    pub async fn list_films(&self) -> ServerResult<Vec<Film>> {
        Ok(self.store.list_films().await?)
    }

    /// Deletes a film.
    pub async fn delete_film(&self, id: i64) -> ServerResult<()> {
        self.store.delete_film(id).await?;
        tracing::info!(film_id = id, "Film deleted");
        Ok(())
    }

    /// Deletes every film.
    pub async fn delete_all_films(&self) -> ServerResult<()> {
        self.store.delete_all_films().await?;
        tracing::info!("All films deleted");
        Ok(())
    }

    /// Records a like. Liking twice has no further effect.
    pub async fn add_like(&self, film_id: i64, user_id: i64) -> ServerResult<()> {
        self.store.get_user(user_id).await?;
        self.store.add_like(film_id, user_id).await?;

        tracing::info!(film_id, user_id, "Like added");

        Ok(())
    }

    /// Removes a like the user previously gave.
    pub async fn remove_like(&self, film_id: i64, user_id: i64) -> ServerResult<()> {
        self.store.get_user(user_id).await?;
        self.store.get_film(film_id).await?;

        if !self.store.likes(film_id).await?.contains(&user_id) {
            return Err(ServerError::IncorrectId(format!(
                "user {user_id} has not liked film {film_id}"
            )));
        }
        self.store.remove_like(film_id, user_id).await?;

        tracing::info!(film_id, user_id, "Like removed");

        Ok(())
    }

    /// Returns up to `count` films, most liked first.
    ///
    /// Films with equal like counts keep their creation order.
    pub async fn top_films(&self, count: usize) -> ServerResult<Vec<Film>> {
        let mut films = self.store.list_films().await?;
        films.sort_by(|a, b| b.like_count().cmp(&a.like_count()));
        films.truncate(count);
        Ok(films)
    }
}

/// Runs field rules, then the release date floor.
fn check_film(input: &FilmInput) -> ServerResult<()> {
    input.validate()?;

    if let Some(release_date) = input.release_date {
        if release_date < EARLIEST_RELEASE_DATE {
            return Err(ServerError::Validation(format!(
                "release date {release_date} is before {EARLIEST_RELEASE_DATE}"
            )));
        }
    }
    Ok(())
}
