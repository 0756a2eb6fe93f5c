//! Application state.

use std::sync::Arc;

use catalog_store::CatalogStore;

use crate::services::{FilmService, UserService};

/// Shared application state.
pub struct AppState<S: CatalogStore> {
    /// Catalog store, used directly for read-only lookups.
    pub store: Arc<S>,
    /// Film service.
    pub films: FilmService<S>,
    /// User service.
    pub users: UserService<S>,
}

impl<S: CatalogStore> AppState<S> {
    /// Creates new application state.
    pub fn new(store: S) -> Self {
        let store = Arc::new(store);
        Self {
            films: FilmService::new(Arc::clone(&store)),
            users: UserService::new(Arc::clone(&store)),
            store,
        }
    }
}
