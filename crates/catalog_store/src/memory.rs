//! In-memory catalog store implementation.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use entities::{Film, FriendStatus, Genre, Mpa, User};
use tokio::sync::RwLock;

use crate::{CatalogStore, CatalogStoreError, CatalogStoreResult};

/// In-memory catalog store.
///
/// Entity maps are keyed by id, and ids only grow, so iterating a map yields
/// entities in creation order. Association tables are the authority for
/// likes, genres and friendship statuses; the copies kept inside stored
/// entities are overwritten on every read.
#[derive(Debug)]
pub struct MemoryCatalogStore {
    films: Arc<RwLock<BTreeMap<i64, Film>>>,
    users: Arc<RwLock<BTreeMap<i64, User>>>,
    likes: Arc<RwLock<BTreeMap<i64, BTreeSet<i64>>>>,
    film_genres: Arc<RwLock<BTreeMap<i64, BTreeSet<i32>>>>,
    friendships: Arc<RwLock<BTreeMap<i64, BTreeMap<i64, FriendStatus>>>>,
    genres: BTreeMap<i32, Genre>,
    mpa: BTreeMap<i32, Mpa>,
    next_film_id: AtomicI64,
    next_user_id: AtomicI64,
}

impl Default for MemoryCatalogStore {
    fn default() -> Self {
        Self {
            films: Arc::default(),
            users: Arc::default(),
            likes: Arc::default(),
            film_genres: Arc::default(),
            friendships: Arc::default(),
            genres: Genre::defaults().into_iter().map(|g| (g.id, g)).collect(),
            mpa: Mpa::defaults().into_iter().map(|m| (m.id, m)).collect(),
            next_film_id: AtomicI64::new(1),
            next_user_id: AtomicI64::new(1),
        }
    }
}

impl MemoryCatalogStore {
    /// Creates a new in-memory store seeded with the default lookup data.
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup_mpa(&self, mpa: Option<&Mpa>) -> CatalogStoreResult<Option<Mpa>> {
        mpa.map(|m| {
            self.mpa
                .get(&m.id)
                .cloned()
                .ok_or_else(|| CatalogStoreError::not_found("Mpa", m.id))
        })
        .transpose()
    }

    fn check_genres(&self, genre_ids: &BTreeSet<i32>) -> CatalogStoreResult<()> {
        match genre_ids.iter().find(|id| !self.genres.contains_key(id)) {
            Some(id) => Err(CatalogStoreError::not_found("Genre", id)),
            None => Ok(()),
        }
    }

    /// Fills a film's associations from the association tables.
    fn hydrate_film(
        &self,
        mut film: Film,
        likes: &BTreeMap<i64, BTreeSet<i64>>,
        film_genres: &BTreeMap<i64, BTreeSet<i32>>,
    ) -> Film {
        film.likes = likes.get(&film.id).cloned().unwrap_or_default();
        film.genres = film_genres
            .get(&film.id)
            .map(|ids| ids.iter().filter_map(|id| self.genres.get(id).cloned()).collect())
            .unwrap_or_default();
        film
    }

    fn hydrate_user(
        mut user: User,
        friendships: &BTreeMap<i64, BTreeMap<i64, FriendStatus>>,
    ) -> User {
        user.friend_statuses = friendships.get(&user.id).cloned().unwrap_or_default();
        user
    }

    async fn read_film(&self, id: i64) -> CatalogStoreResult<Film> {
        let films = self.films.read().await;
        let film = films
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogStoreError::not_found("Film", id))?;
        let likes = self.likes.read().await;
        let film_genres = self.film_genres.read().await;
        Ok(self.hydrate_film(film, &likes, &film_genres))
    }

    async fn read_user(&self, id: i64) -> CatalogStoreResult<User> {
        let users = self.users.read().await;
        let user = users
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogStoreError::not_found("User", id))?;
        let friendships = self.friendships.read().await;
        Ok(Self::hydrate_user(user, &friendships))
    }
}

// Locks are always taken in the order films, users, likes, film_genres,
// friendships.
#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    // =========================================================================
    // Film operations
    // =========================================================================

    async fn create_film(&self, mut film: Film) -> CatalogStoreResult<Film> {
        film.mpa = self.lookup_mpa(film.mpa.as_ref())?;
        let genre_ids = film.genre_ids();
        self.check_genres(&genre_ids)?;

        let mut films = self.films.write().await;
        let mut likes = self.likes.write().await;
        let mut film_genres = self.film_genres.write().await;

        film.id = self.next_film_id.fetch_add(1, Ordering::SeqCst);
        if !film.likes.is_empty() {
            likes.insert(film.id, film.likes.clone());
        }
        if !genre_ids.is_empty() {
            film_genres.insert(film.id, genre_ids);
        }
        films.insert(film.id, film.clone());

        Ok(self.hydrate_film(film, &likes, &film_genres))
    }

    async fn update_film(&self, mut film: Film) -> CatalogStoreResult<Film> {
        film.mpa = self.lookup_mpa(film.mpa.as_ref())?;
        let genre_ids = film.genre_ids();
        self.check_genres(&genre_ids)?;

        let mut films = self.films.write().await;
        if !films.contains_key(&film.id) {
            return Err(CatalogStoreError::not_found("Film", film.id));
        }
        let likes = self.likes.read().await;
        let mut film_genres = self.film_genres.write().await;

        if genre_ids.is_empty() {
            film_genres.remove(&film.id);
        } else {
            film_genres.insert(film.id, genre_ids);
        }
        films.insert(film.id, film.clone());

        Ok(self.hydrate_film(film, &likes, &film_genres))
    }

    async fn get_film(&self, id: i64) -> CatalogStoreResult<Film> {
        self.read_film(id).await
    }

    async fn list_films(&self) -> CatalogStoreResult<Vec<Film>> {
        let films = self.films.read().await;
        let likes = self.likes.read().await;
        let film_genres = self.film_genres.read().await;
        Ok(films
            .values()
            .cloned()
            .map(|film| self.hydrate_film(film, &likes, &film_genres))
            .collect())
    }

    async fn delete_film(&self, id: i64) -> CatalogStoreResult<()> {
        let mut films = self.films.write().await;
        if films.remove(&id).is_none() {
            return Err(CatalogStoreError::not_found("Film", id));
        }
        self.likes.write().await.remove(&id);
        self.film_genres.write().await.remove(&id);
        Ok(())
    }

    async fn delete_all_films(&self) -> CatalogStoreResult<()> {
        let mut films = self.films.write().await;
        films.clear();
        self.likes.write().await.clear();
        self.film_genres.write().await.clear();
        Ok(())
    }

    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, mut user: User) -> CatalogStoreResult<User> {
        let mut users = self.users.write().await;
        let mut friendships = self.friendships.write().await;

        user.id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
        if !user.friend_statuses.is_empty() {
            friendships.insert(user.id, user.friend_statuses.clone());
        }
        users.insert(user.id, user.clone());

        Ok(Self::hydrate_user(user, &friendships))
    }

    async fn update_user(&self, user: User) -> CatalogStoreResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(CatalogStoreError::not_found("User", user.id));
        }
        users.insert(user.id, user.clone());

        let friendships = self.friendships.read().await;
        Ok(Self::hydrate_user(user, &friendships))
    }

    async fn get_user(&self, id: i64) -> CatalogStoreResult<User> {
        self.read_user(id).await
    }

    async fn list_users(&self) -> CatalogStoreResult<Vec<User>> {
        let users = self.users.read().await;
        let friendships = self.friendships.read().await;
        Ok(users
            .values()
            .cloned()
            .map(|user| Self::hydrate_user(user, &friendships))
            .collect())
    }

    async fn delete_user(&self, id: i64) -> CatalogStoreResult<()> {
        let mut users = self.users.write().await;
        if users.remove(&id).is_none() {
            return Err(CatalogStoreError::not_found("User", id));
        }

        let mut likes = self.likes.write().await;
        for fans in likes.values_mut() {
            fans.remove(&id);
        }
        likes.retain(|_, fans| !fans.is_empty());

        let mut friendships = self.friendships.write().await;
        friendships.remove(&id);
        for statuses in friendships.values_mut() {
            statuses.remove(&id);
        }
        friendships.retain(|_, statuses| !statuses.is_empty());
        Ok(())
    }

    async fn delete_all_users(&self) -> CatalogStoreResult<()> {
        let mut users = self.users.write().await;
        users.clear();
        self.likes.write().await.clear();
        self.friendships.write().await.clear();
        Ok(())
    }

    // =========================================================================
    // Like operations
    // =========================================================================

    async fn add_like(&self, film_id: i64, user_id: i64) -> CatalogStoreResult<()> {
        let films = self.films.read().await;
        if !films.contains_key(&film_id) {
            return Err(CatalogStoreError::not_found("Film", film_id));
        }
        self.likes
            .write()
            .await
            .entry(film_id)
            .or_default()
            .insert(user_id);
        Ok(())
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> CatalogStoreResult<()> {
        let mut likes = self.likes.write().await;
        if let Some(fans) = likes.get_mut(&film_id) {
            fans.remove(&user_id);
            if fans.is_empty() {
                likes.remove(&film_id);
            }
        }
        Ok(())
    }

    async fn likes(&self, film_id: i64) -> CatalogStoreResult<BTreeSet<i64>> {
        let likes = self.likes.read().await;
        Ok(likes.get(&film_id).cloned().unwrap_or_default())
    }

    // =========================================================================
    // Genre operations
    // =========================================================================

    async fn replace_film_genres(
        &self,
        film_id: i64,
        genre_ids: &BTreeSet<i32>,
    ) -> CatalogStoreResult<()> {
        self.check_genres(genre_ids)?;

        let films = self.films.read().await;
        if !films.contains_key(&film_id) {
            return Err(CatalogStoreError::not_found("Film", film_id));
        }
        let mut film_genres = self.film_genres.write().await;
        if genre_ids.is_empty() {
            film_genres.remove(&film_id);
        } else {
            film_genres.insert(film_id, genre_ids.clone());
        }
        Ok(())
    }

    async fn film_genres(&self, film_id: i64) -> CatalogStoreResult<Vec<Genre>> {
        let film_genres = self.film_genres.read().await;
        Ok(film_genres
            .get(&film_id)
            .map(|ids| ids.iter().filter_map(|id| self.genres.get(id).cloned()).collect())
            .unwrap_or_default())
    }

    async fn list_genres(&self) -> CatalogStoreResult<Vec<Genre>> {
        Ok(self.genres.values().cloned().collect())
    }

    async fn get_genre(&self, id: i32) -> CatalogStoreResult<Genre> {
        self.genres
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogStoreError::not_found("Genre", id))
    }

    // =========================================================================
    // MPA rating operations
    // =========================================================================

    async fn list_mpa(&self) -> CatalogStoreResult<Vec<Mpa>> {
        Ok(self.mpa.values().cloned().collect())
    }

    async fn get_mpa(&self, id: i32) -> CatalogStoreResult<Mpa> {
        self.mpa
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogStoreError::not_found("Mpa", id))
    }

    // =========================================================================
    // Friendship operations
    // =========================================================================

    async fn set_friend_status(
        &self,
        user_id: i64,
        friend_id: i64,
        status: FriendStatus,
    ) -> CatalogStoreResult<()> {
        let users = self.users.read().await;
        for id in [user_id, friend_id] {
            if !users.contains_key(&id) {
                return Err(CatalogStoreError::not_found("User", id));
            }
        }
        self.friendships
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(friend_id, status);
        Ok(())
    }

    async fn clear_friendship(&self, user_id: i64, friend_id: i64) -> CatalogStoreResult<()> {
        let mut friendships = self.friendships.write().await;
        for (from, to) in [(user_id, friend_id), (friend_id, user_id)] {
            if let Some(statuses) = friendships.get_mut(&from) {
                statuses.remove(&to);
                if statuses.is_empty() {
                    friendships.remove(&from);
                }
            }
        }
        Ok(())
    }

    async fn friend_statuses(
        &self,
        user_id: i64,
    ) -> CatalogStoreResult<BTreeMap<i64, FriendStatus>> {
        let friendships = self.friendships.read().await;
        Ok(friendships.get(&user_id).cloned().unwrap_or_default())
    }
}
