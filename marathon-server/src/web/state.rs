//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedCatalog;
use crate::catalog::FileCatalog;
use crate::domain::TheaterCode;
use crate::theaters::TheaterDirectory;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Memoized showtimes catalogs
    pub catalog: Arc<CachedCatalog<FileCatalog>>,

    /// Theater lookup and drive-time clusters
    pub directory: Arc<TheaterDirectory>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(catalog: CachedCatalog<FileCatalog>, directory: TheaterDirectory) -> Self {
        Self {
            catalog: Arc::new(catalog),
            directory: Arc::new(directory),
        }
    }

    /// Display name for a theater, falling back to its code.
    pub fn theater_name(&self, code: &TheaterCode) -> String {
        self.directory
            .get(code)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| code.to_string())
    }
}
