use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use storage::repository::Storage;
use trivia_core::Catalog;

use crate::Clock;
use crate::error::AppServicesError;
use crate::sessions::{SessionHistoryService, SessionLoopService};
use crate::stats_service::StatsService;

/// Assembles app-facing services over one catalog and one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    session_loop: Arc<SessionLoopService>,
    history: Arc<SessionHistoryService>,
    stats: Arc<StatsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: Catalog,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        tracing::info!(questions = catalog.len(), "services ready");
        Ok(Self::from_storage(&storage, clock, catalog))
    }

    /// Build services over in-memory repositories.
    #[must_use]
    pub fn in_memory(clock: Clock, catalog: Catalog) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, catalog)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, catalog: Catalog) -> Self {
        let catalog = Arc::new(catalog);
        let session_loop = Arc::new(SessionLoopService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.stats),
            Arc::clone(&storage.players),
            Arc::clone(&storage.summaries),
        ));
        let history = Arc::new(SessionHistoryService::new(Arc::clone(&storage.summaries)));
        let stats = Arc::new(StatsService::new(Arc::clone(&storage.stats)));

        Self {
            catalog,
            session_loop,
            history,
            stats,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    #[must_use]
    pub fn history(&self) -> Arc<SessionHistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats)
    }
}

/// Load the question catalog from a JSON file, or the built-in sample when
/// no path is given.
///
/// # Errors
///
/// Returns `AppServicesError::CatalogFile` if the file cannot be opened and
/// `AppServicesError::Catalog` if its contents are invalid.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, AppServicesError> {
    let Some(path) = path else {
        return Ok(Catalog::sample()?);
    };

    let file = File::open(path).map_err(|source| AppServicesError::CatalogFile {
        path: path.display().to_string(),
        source,
    })?;
    let catalog = Catalog::from_json_reader(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), questions = catalog.len(), "catalog loaded");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::time::fixed_clock;

    #[test]
    fn missing_path_loads_sample() {
        let catalog = load_catalog(None).unwrap();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn unreadable_catalog_reports_path() {
        let err = load_catalog(Some(Path::new("/nonexistent/catalog.json"))).unwrap_err();
        assert!(
            matches!(err, AppServicesError::CatalogFile { ref path, .. } if path.contains("catalog.json"))
        );
    }

    #[test]
    fn in_memory_services_share_catalog() {
        let services = AppServices::in_memory(fixed_clock(), Catalog::sample().unwrap());
        assert_eq!(services.catalog().len(), services.session_loop().catalog().len());
    }
}
