use std::sync::Arc;

use lit_core::cache::{InMemoryCache, ReadingCache};
use storage::FileCache;
use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::config::LitConfig;
use crate::error::AppServicesError;
use crate::games_service::GamesService;
use crate::progress_service::ProgressService;
use crate::reader_session::ReaderService;
use crate::recommendation_service::{RecommendationConfig, RecommendationService};
use crate::results_service::ResultService;
use crate::retry::RetryPolicy;

/// Assembles app-facing services over one storage backend and one cache.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    progress: Arc<ProgressService>,
    reader: Arc<ReaderService>,
    results: Arc<ResultService>,
    games: Arc<GamesService>,
    recommendations: Arc<RecommendationService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage as configured.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or opening the
    /// cache file fails.
    pub async fn new_sqlite(config: &LitConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.database_url).await?;
        let cache: Arc<dyn ReadingCache> = match &config.cache_path {
            Some(path) => Arc::new(FileCache::open(path.clone())?),
            None => Arc::new(InMemoryCache::new()),
        };
        info!(db = %config.database_url, "storage ready");
        Ok(Self::from_parts(
            &storage,
            cache,
            clock,
            config.retry_policy(),
            config.recommendation(),
        ))
    }

    /// In-memory storage and cache, recommendations disabled.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        let cache: Arc<dyn ReadingCache> = Arc::new(InMemoryCache::new());
        Self::from_parts(&Storage::in_memory(), cache, clock, RetryPolicy::default(), None)
    }

    /// Wire services over existing storage and cache.
    #[must_use]
    pub fn from_parts(
        storage: &Storage,
        cache: Arc<dyn ReadingCache>,
        clock: Clock,
        retry: RetryPolicy,
        recommendation: Option<RecommendationConfig>,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(Arc::clone(&storage.catalog)));
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&storage.progress),
            Arc::clone(&storage.catalog),
            Arc::clone(&cache),
            retry,
        ));
        let reader = Arc::new(ReaderService::new(
            Arc::clone(&storage.catalog),
            Arc::clone(&progress),
        ));
        let results = Arc::new(ResultService::new(
            clock,
            Arc::clone(&storage.results),
            Arc::clone(&storage.catalog),
        ));
        let games = Arc::new(GamesService::new(
            clock,
            Arc::clone(&storage.catalog),
            Arc::clone(&results),
        ));
        let recommendations = Arc::new(RecommendationService::new(recommendation, cache));

        Self {
            catalog,
            progress,
            reader,
            results,
            games,
            recommendations,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn reader(&self) -> Arc<ReaderService> {
        Arc::clone(&self.reader)
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultService> {
        Arc::clone(&self.results)
    }

    #[must_use]
    pub fn games(&self) -> Arc<GamesService> {
        Arc::clone(&self.games)
    }

    #[must_use]
    pub fn recommendations(&self) -> Arc<RecommendationService> {
        Arc::clone(&self.recommendations)
    }
}
