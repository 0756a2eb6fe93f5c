//! Read-only reference data: genres and MPA age ratings.

use serde::{Deserialize, Serialize};

/// A film genre.
///
/// Request payloads may reference a genre by `id` alone; the name is filled in
/// from the store when the film is read back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Genre {
    /// Lookup identifier.
    pub id: i32,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl Genre {
    /// Creates a genre.
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Creates a reference to a genre by id only.
    pub fn reference(id: i32) -> Self {
        Self::new(id, "")
    }

    /// Genres seeded into every store.
    pub fn defaults() -> Vec<Genre> {
        [
            (1, "Comedy"),
            (2, "Drama"),
            (3, "Animation"),
            (4, "Thriller"),
            (5, "Documentary"),
            (6, "Action"),
        ]
        .into_iter()
        .map(|(id, name)| Genre::new(id, name))
        .collect()
    }
}

/// MPA film rating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MpaRating {
    /// General audiences.
    G,
    /// Parental guidance suggested.
    Pg,
    /// Parents strongly cautioned.
    Pg13,
    /// Restricted.
    R,
    /// Adults only.
    Nc17,
}

impl MpaRating {
    /// All ratings, in lookup id order.
    pub const ALL: [MpaRating; 5] = [
        MpaRating::G,
        MpaRating::Pg,
        MpaRating::Pg13,
        MpaRating::R,
        MpaRating::Nc17,
    ];

    /// Lookup identifier of this rating.
    pub fn id(self) -> i32 {
        match self {
            MpaRating::G => 1,
            MpaRating::Pg => 2,
            MpaRating::Pg13 => 3,
            MpaRating::R => 4,
            MpaRating::Nc17 => 5,
        }
    }

    /// Display name of this rating.
    pub fn as_str(self) -> &'static str {
        match self {
            MpaRating::G => "G",
            MpaRating::Pg => "PG",
            MpaRating::Pg13 => "PG-13",
            MpaRating::R => "R",
            MpaRating::Nc17 => "NC-17",
        }
    }
}

/// An MPA rating as exposed through the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mpa {
    /// Lookup identifier.
    pub id: i32,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl Mpa {
    /// Creates a reference to a rating by id only.
    pub fn reference(id: i32) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }

    /// Ratings seeded into every store.
    pub fn defaults() -> Vec<Mpa> {
        MpaRating::ALL.into_iter().map(Mpa::from).collect()
    }
}

impl From<MpaRating> for Mpa {
    fn from(rating: MpaRating) -> Self {
        Self {
            id: rating.id(),
            name: rating.as_str().to_string(),
        }
    }
}
