//! Catalog store error types.

use thiserror::Error;

/// Errors that can occur during catalog store operations.
#[derive(Debug, Error)]
pub enum CatalogStoreError {
    /// Entity not found.
    #[error("{entity_type} with id {id} does not exist")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be decoded.
    #[error("Corrupted record: {0}")]
    Corrupted(String),
}

impl CatalogStoreError {
    /// Creates a not found error.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Returns true if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for catalog store operations.
pub type CatalogStoreResult<T> = Result<T, CatalogStoreError>;
