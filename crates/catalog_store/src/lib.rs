//! Storage for the film catalogue.
//!
//! This crate provides a storage abstraction for films, users and the
//! associations between them (likes, genres, friendships), plus the read-only
//! genre and MPA lookup tables. It ships an in-memory implementation and a
//! SQLite implementation.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
