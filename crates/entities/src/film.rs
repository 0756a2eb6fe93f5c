//! Film entity definitions.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Genre, Mpa};

/// Earliest accepted release date (the first public film screening).
pub const EARLIEST_RELEASE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1895, 12, 28) {
    Some(date) => date,
    None => panic!("invalid release date floor"),
};

/// A film in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    /// Identifier assigned by the store on creation.
    pub id: i64,
    /// Title.
    pub name: String,
    /// Optional short description.
    pub description: Option<String>,
    /// Release date.
    pub release_date: Option<NaiveDate>,
    /// Duration in minutes.
    pub duration: i32,
    /// Age rating.
    pub mpa: Option<Mpa>,
    /// Genres, ordered by id.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Ids of users who liked this film.
    #[serde(default)]
    pub likes: BTreeSet<i64>,
}

impl Film {
    /// Creates a film with no id, associations or optional fields.
    pub fn new(name: impl Into<String>, duration: i32) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: None,
            release_date: None,
            duration,
            mpa: None,
            genres: Vec::new(),
            likes: BTreeSet::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the release date.
    pub fn with_release_date(mut self, release_date: NaiveDate) -> Self {
        self.release_date = Some(release_date);
        self
    }

    /// Sets the MPA rating.
    pub fn with_mpa(mut self, mpa: Mpa) -> Self {
        self.mpa = Some(mpa);
        self
    }

    /// Sets the genres.
    pub fn with_genres(mut self, genres: impl IntoIterator<Item = Genre>) -> Self {
        self.genres = genres.into_iter().collect();
        self
    }

    /// Ids of this film's genres, deduplicated.
    pub fn genre_ids(&self) -> BTreeSet<i32> {
        self.genres.iter().map(|g| g.id).collect()
    }

    /// Number of likes.
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}

/// Request payload for creating or updating a film.
///
/// Unlike [`Film`], associations are optional so that an update can tell an
/// omitted genre list apart from an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilmInput {
    /// Required on update, ignored on create.
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub duration: i32,
    pub mpa: Option<Mpa>,
    pub genres: Option<Vec<Genre>>,
    pub likes: Option<BTreeSet<i64>>,
}

impl FilmInput {
    /// Converts the payload into a film, keeping its associations as given.
    pub fn into_film(self) -> Film {
        let mut genres = self.genres.unwrap_or_default();
        genres.sort_by_key(|g| g.id);
        genres.dedup_by_key(|g| g.id);

        Film {
            id: self.id.unwrap_or_default(),
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            mpa: self.mpa,
            genres,
            likes: self.likes.unwrap_or_default(),
        }
    }
}

impl From<Film> for FilmInput {
    fn from(film: Film) -> Self {
        Self {
            id: Some(film.id),
            name: film.name,
            description: film.description,
            release_date: film.release_date,
            duration: film.duration,
            mpa: film.mpa,
            genres: Some(film.genres),
            likes: Some(film.likes),
        }
    }
}
