//! Aggregation services composing the catalog store.

pub mod films;
pub mod users;

pub use films::FilmService;
pub use users::UserService;
