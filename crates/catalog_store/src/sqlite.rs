//! SQLite catalog store implementation.

use std::{
    collections::{BTreeMap, BTreeSet},
    str::FromStr,
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use entities::{Film, FriendStatus, Genre, Mpa, User};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, Pool, Sqlite,
};

use crate::{CatalogStore, CatalogStoreError, CatalogStoreResult};

/// SQL schema for the catalogue.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS mpa_ratings (
    mpa_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS genres (
    genre_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS films (
    film_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    release_date TEXT,
    duration INTEGER NOT NULL,
    mpa_id INTEGER REFERENCES mpa_ratings(mpa_id)
);

CREATE TABLE IF NOT EXISTS film_genres (
    film_id INTEGER NOT NULL REFERENCES films(film_id) ON DELETE CASCADE,
    genre_id INTEGER NOT NULL REFERENCES genres(genre_id),
    PRIMARY KEY (film_id, genre_id)
);

CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL,
    login TEXT NOT NULL,
    name TEXT NOT NULL,
    birthday TEXT
);

CREATE TABLE IF NOT EXISTS likes (
    film_id INTEGER NOT NULL REFERENCES films(film_id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    PRIMARY KEY (film_id, user_id)
);

CREATE TABLE IF NOT EXISTS friendships (
    user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    friend_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    PRIMARY KEY (user_id, friend_id)
);
"#;

const FILM_SELECT: &str = "SELECT f.film_id, f.name, f.description, f.release_date, f.duration, \
                           f.mpa_id, m.name AS mpa_name
                           FROM films f
                           LEFT JOIN mpa_ratings m ON m.mpa_id = f.mpa_id";

const USER_SELECT: &str = "SELECT user_id, email, login, name, birthday FROM users";

/// Database row for Film
#[derive(Debug, FromRow)]
struct FilmRow {
    film_id: i64,
    name: String,
    description: Option<String>,
    release_date: Option<NaiveDate>,
    duration: i32,
    mpa_id: Option<i32>,
    mpa_name: Option<String>,
}

impl FilmRow {
    fn into_film(self, genres: Vec<Genre>, likes: BTreeSet<i64>) -> Film {
        let mpa = match (self.mpa_id, self.mpa_name) {
            (Some(id), Some(name)) => Some(Mpa { id, name }),
            _ => None,
        };
        Film {
            id: self.film_id,
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            mpa,
            genres,
            likes,
        }
    }
}

/// Database row for User
#[derive(Debug, FromRow)]
struct UserRow {
    user_id: i64,
    email: String,
    login: String,
    name: String,
    birthday: Option<NaiveDate>,
}

impl UserRow {
    fn into_user(self, friend_statuses: BTreeMap<i64, FriendStatus>) -> User {
        User {
            id: self.user_id,
            email: self.email,
            login: self.login,
            name: self.name,
            birthday: self.birthday,
            friend_statuses,
        }
    }
}

fn parse_status(status: &str) -> CatalogStoreResult<FriendStatus> {
    FriendStatus::from_str(status).map_err(CatalogStoreError::Corrupted)
}

/// SQLite-backed catalog store.
#[derive(Debug, Clone)]
pub struct SqliteCatalogStore {
    pool: Pool<Sqlite>,
}

impl SqliteCatalogStore {
    /// Connects to the database at `url`, creating it if missing, and runs
    /// migrations.
    pub async fn connect(url: &str) -> CatalogStoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds a single connection that never expires, since every
    /// SQLite connection to `:memory:` sees its own database.
    pub async fn in_memory() -> CatalogStoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Wraps an existing pool and runs migrations.
    pub async fn from_pool(pool: Pool<Sqlite>) -> CatalogStoreResult<Self> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Creates tables and seeds lookup data.
    async fn run_migrations(&self) -> CatalogStoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;

        for mpa in Mpa::defaults() {
            sqlx::query("INSERT OR IGNORE INTO mpa_ratings (mpa_id, name) VALUES (?, ?)")
                .bind(mpa.id)
                .bind(&mpa.name)
                .execute(&self.pool)
                .await?;
        }
        for genre in Genre::defaults() {
            sqlx::query("INSERT OR IGNORE INTO genres (genre_id, name) VALUES (?, ?)")
                .bind(genre.id)
                .bind(&genre.name)
                .execute(&self.pool)
                .await?;
        }

        tracing::debug!("Catalog schema ready");
        Ok(())
    }

    async fn check_lookups(&self, film: &Film) -> CatalogStoreResult<()> {
        if let Some(mpa) = &film.mpa {
            self.get_mpa(mpa.id).await?;
        }
        for genre_id in film.genre_ids() {
            self.get_genre(genre_id).await?;
        }
        Ok(())
    }

    async fn film_exists(&self, film_id: i64) -> CatalogStoreResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM films WHERE film_id = ?")
            .bind(film_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    // =========================================================================
    // Film operations
    // =========================================================================

    async fn create_film(&self, film: Film) -> CatalogStoreResult<Film> {
        self.check_lookups(&film).await?;

        let mut tx = self.pool.begin().await?;

        let film_id = sqlx::query(
            "INSERT INTO films (name, description, release_date, duration, mpa_id)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa.as_ref().map(|m| m.id))
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for genre_id in film.genre_ids() {
            sqlx::query("INSERT INTO film_genres (film_id, genre_id) VALUES (?, ?)")
                .bind(film_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }
        for user_id in &film.likes {
            sqlx::query("INSERT OR IGNORE INTO likes (film_id, user_id) VALUES (?, ?)")
                .bind(film_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_film(film_id).await
    }

    async fn update_film(&self, film: Film) -> CatalogStoreResult<Film> {
        self.check_lookups(&film).await?;

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE films SET name = ?, description = ?, release_date = ?, duration = ?, mpa_id = ?
             WHERE film_id = ?",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa.as_ref().map(|m| m.id))
        .bind(film.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(CatalogStoreError::not_found("Film", film.id));
        }

        sqlx::query("DELETE FROM film_genres WHERE film_id = ?")
            .bind(film.id)
            .execute(&mut *tx)
            .await?;
        for genre_id in film.genre_ids() {
            sqlx::query("INSERT INTO film_genres (film_id, genre_id) VALUES (?, ?)")
                .bind(film.id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_film(film.id).await
    }

    async fn get_film(&self, id: i64) -> CatalogStoreResult<Film> {
        let row: FilmRow = sqlx::query_as(&format!("{FILM_SELECT} WHERE f.film_id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogStoreError::not_found("Film", id))?;

        let genres = self.film_genres(id).await?;
        let likes = self.likes(id).await?;
        Ok(row.into_film(genres, likes))
    }

    async fn list_films(&self) -> CatalogStoreResult<Vec<Film>> {
        let rows: Vec<FilmRow> = sqlx::query_as(&format!("{FILM_SELECT} ORDER BY f.film_id"))
            .fetch_all(&self.pool)
            .await?;

        let like_rows: Vec<(i64, i64)> =
            sqlx::query_as("SELECT film_id, user_id FROM likes")
                .fetch_all(&self.pool)
                .await?;
        let mut likes: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
        for (film_id, user_id) in like_rows {
            likes.entry(film_id).or_default().insert(user_id);
        }

        let genre_rows: Vec<(i64, i32, String)> = sqlx::query_as(
            "SELECT fg.film_id, g.genre_id, g.name
             FROM film_genres fg
             JOIN genres g ON g.genre_id = fg.genre_id
             ORDER BY fg.film_id, g.genre_id",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut genres: BTreeMap<i64, Vec<Genre>> = BTreeMap::new();
        for (film_id, genre_id, name) in genre_rows {
            genres.entry(film_id).or_default().push(Genre::new(genre_id, name));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let film_genres = genres.remove(&row.film_id).unwrap_or_default();
                let film_likes = likes.remove(&row.film_id).unwrap_or_default();
                row.into_film(film_genres, film_likes)
            })
            .collect())
    }

    async fn delete_film(&self, id: i64) -> CatalogStoreResult<()> {
        let deleted = sqlx::query("DELETE FROM films WHERE film_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(CatalogStoreError::not_found("Film", id));
        }
        Ok(())
    }

    async fn delete_all_films(&self) -> CatalogStoreResult<()> {
        sqlx::query("DELETE FROM films").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> CatalogStoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query(
            "INSERT INTO users (email, login, name, birthday) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for (friend_id, status) in &user.friend_statuses {
            sqlx::query("INSERT INTO friendships (user_id, friend_id, status) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(friend_id)
                .bind(status.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_user(user_id).await
    }

    async fn update_user(&self, user: User) -> CatalogStoreResult<User> {
        let updated = sqlx::query(
            "UPDATE users SET email = ?, login = ?, name = ?, birthday = ? WHERE user_id = ?",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .bind(user.id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(CatalogStoreError::not_found("User", user.id));
        }

        self.get_user(user.id).await
    }

    async fn get_user(&self, id: i64) -> CatalogStoreResult<User> {
        let row: UserRow = sqlx::query_as(&format!("{USER_SELECT} WHERE user_id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogStoreError::not_found("User", id))?;

        let statuses = self.friend_statuses(id).await?;
        Ok(row.into_user(statuses))
    }

    async fn list_users(&self) -> CatalogStoreResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!("{USER_SELECT} ORDER BY user_id"))
            .fetch_all(&self.pool)
            .await?;

        let status_rows: Vec<(i64, i64, String)> =
            sqlx::query_as("SELECT user_id, friend_id, status FROM friendships")
                .fetch_all(&self.pool)
                .await?;
        let mut statuses: BTreeMap<i64, BTreeMap<i64, FriendStatus>> = BTreeMap::new();
        for (user_id, friend_id, status) in status_rows {
            statuses
                .entry(user_id)
                .or_default()
                .insert(friend_id, parse_status(&status)?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let user_statuses = statuses.remove(&row.user_id).unwrap_or_default();
                row.into_user(user_statuses)
            })
            .collect())
    }

    async fn delete_user(&self, id: i64) -> CatalogStoreResult<()> {
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(CatalogStoreError::not_found("User", id));
        }
        Ok(())
    }

    async fn delete_all_users(&self) -> CatalogStoreResult<()> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Like operations
    // =========================================================================

    async fn add_like(&self, film_id: i64, user_id: i64) -> CatalogStoreResult<()> {
        if !self.film_exists(film_id).await? {
            return Err(CatalogStoreError::not_found("Film", film_id));
        }

        sqlx::query("INSERT OR IGNORE INTO likes (film_id, user_id) VALUES (?, ?)")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> CatalogStoreResult<()> {
        sqlx::query("DELETE FROM likes WHERE film_id = ? AND user_id = ?")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn likes(&self, film_id: i64) -> CatalogStoreResult<BTreeSet<i64>> {
        let user_ids: Vec<i64> = sqlx::query_scalar("SELECT user_id FROM likes WHERE film_id = ?")
            .bind(film_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(user_ids.into_iter().collect())
    }

    // =========================================================================
    // Genre operations
    // =========================================================================

    async fn replace_film_genres(
        &self,
        film_id: i64,
        genre_ids: &BTreeSet<i32>,
    ) -> CatalogStoreResult<()> {
        for genre_id in genre_ids {
            self.get_genre(*genre_id).await?;
        }
        if !self.film_exists(film_id).await? {
            return Err(CatalogStoreError::not_found("Film", film_id));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM film_genres WHERE film_id = ?")
            .bind(film_id)
            .execute(&mut *tx)
            .await?;
        for genre_id in genre_ids {
            sqlx::query("INSERT INTO film_genres (film_id, genre_id) VALUES (?, ?)")
                .bind(film_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn film_genres(&self, film_id: i64) -> CatalogStoreResult<Vec<Genre>> {
        let rows: Vec<(i32, String)> = sqlx::query_as(
            "SELECT g.genre_id, g.name
             FROM film_genres fg
             JOIN genres g ON g.genre_id = fg.genre_id
             WHERE fg.film_id = ?
             ORDER BY g.genre_id",
        )
        .bind(film_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id, name)| Genre::new(id, name)).collect())
    }

    async fn list_genres(&self) -> CatalogStoreResult<Vec<Genre>> {
        let rows: Vec<(i32, String)> =
            sqlx::query_as("SELECT genre_id, name FROM genres ORDER BY genre_id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id, name)| Genre::new(id, name)).collect())
    }

    async fn get_genre(&self, id: i32) -> CatalogStoreResult<Genre> {
        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT genre_id, name FROM genres WHERE genre_id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(id, name)| Genre::new(id, name))
            .ok_or_else(|| CatalogStoreError::not_found("Genre", id))
    }

    // =========================================================================
    // MPA rating operations
    // =========================================================================

    async fn list_mpa(&self) -> CatalogStoreResult<Vec<Mpa>> {
        let rows: Vec<(i32, String)> =
            sqlx::query_as("SELECT mpa_id, name FROM mpa_ratings ORDER BY mpa_id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id, name)| Mpa { id, name }).collect())
    }

    async fn get_mpa(&self, id: i32) -> CatalogStoreResult<Mpa> {
        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT mpa_id, name FROM mpa_ratings WHERE mpa_id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(id, name)| Mpa { id, name })
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
        for id in [user_id, friend_id] {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
            if count == 0 {
                return Err(CatalogStoreError::not_found("User", id));
            }
        }

        sqlx::query(
            "INSERT INTO friendships (user_id, friend_id, status) VALUES (?, ?, ?)
             ON CONFLICT (user_id, friend_id) DO UPDATE SET status = excluded.status",
        )
        .bind(user_id)
        .bind(friend_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_friendship(&self, user_id: i64, friend_id: i64) -> CatalogStoreResult<()> {
        sqlx::query(
            "DELETE FROM friendships
             WHERE (user_id = ? AND friend_id = ?) OR (user_id = ? AND friend_id = ?)",
        )
        .bind(user_id)
        .bind(friend_id)
        .bind(friend_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn friend_statuses(
        &self,
        user_id: i64,
    ) -> CatalogStoreResult<BTreeMap<i64, FriendStatus>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT friend_id, status FROM friendships WHERE user_id = ? ORDER BY friend_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(friend_id, status)| Ok((friend_id, parse_status(&status)?)))
            .collect()
    }
}
