//! Core entity definitions for the film catalogue.
//!
//! This crate defines the data types shared by the store and the server:
//! films, users, their request payloads, read-only lookup data (genres and
//! MPA ratings) and the validation rules applied to incoming payloads.

mod film;
mod lookup;
mod user;
pub mod validation;

pub use film::*;
pub use lookup::*;
pub use user::*;
pub use validation::{Validate, Violation};
