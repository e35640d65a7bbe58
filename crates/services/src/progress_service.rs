use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use lit_core::cache::ReadingCache;
use lit_core::model::{ProgressRecord, ProgressUpdate, UserId, WorkId, WorkWithAuthor};
use lit_core::reconcile::{
    ProgressView, ReadingStats, dedup_latest, in_progress, latest_for_work,
    legacy_display_percentage, legacy_display_total_pages, reading_stats, reconcile,
};
use storage::repository::{CatalogRepository, NewProgressRecord, ProgressRepository};

use crate::Clock;
use crate::error::ProgressServiceError;
use crate::retry::RetryPolicy;

/// Works shown under "continue reading" by default.
pub const RECENTLY_READ_LIMIT: usize = 3;

/// An unfinished work together with its latest progress row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentWork {
    pub record: ProgressRecord,
    pub work: WorkWithAuthor,
}

/// One row of the progress list, with legacy display totals applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressListItem {
    pub record: ProgressRecord,
    pub title: Option<String>,
    pub display_total_pages: u32,
    pub display_percentage: u8,
}

/// Reads and writes a user's reading position.
///
/// Every write goes to the local cache first and then to the repository.
/// List reads are retried and degrade to empty.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    catalog: Arc<dyn CatalogRepository>,
    cache: Arc<dyn ReadingCache>,
    retry: RetryPolicy,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        catalog: Arc<dyn CatalogRepository>,
        cache: Arc<dyn ReadingCache>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            clock,
            progress,
            catalog,
            cache,
            retry,
        }
    }

    #[must_use]
    pub fn cache(&self) -> Arc<dyn ReadingCache> {
        Arc::clone(&self.cache)
    }

    // ─── Reads ─────────────────────────────────────────────────────────────

    /// All of the user's rows, including superseded ones.
    pub async fn list_progress(&self, user_id: UserId) -> Vec<ProgressRecord> {
        self.retry
            .run_or_default("progress list", || self.progress.list_for_user(user_id))
            .await
    }

    /// The reconciled position in one work.
    pub async fn progress_for(&self, user_id: UserId, work_id: WorkId) -> ProgressView {
        let records = self.list_progress(user_id).await;
        let view = reconcile(&records, work_id, self.cache.page(work_id));
        debug!(
            user = user_id.value(),
            work = work_id.value(),
            source = ?view.source,
            page = view.current_page,
            "reconciled progress"
        );
        view
    }

    /// Share of curriculum works the user has finished.
    pub async fn reading_stats(&self, user_id: UserId) -> ReadingStats {
        let records = self.list_progress(user_id).await;
        let works = match self.catalog.list_works(None).await {
            Ok(works) => works,
            Err(err) => {
                warn!(error = %err, "failed to list works for stats");
                Vec::new()
            }
        };
        let works: Vec<_> = works.into_iter().map(|w| w.work).collect();
        reading_stats(&records, &works)
    }

    /// Unfinished works, most recently read first.
    pub async fn recently_read(&self, user_id: UserId, limit: usize) -> Vec<RecentWork> {
        let records = self.list_progress(user_id).await;
        let mut recent = Vec::new();
        for record in in_progress(&records, usize::MAX) {
            if recent.len() >= limit {
                break;
            }
            match self.catalog.get_work(record.work_id).await {
                Ok(Some(work)) => recent.push(RecentWork { record, work }),
                Ok(None) => debug!(work = record.work_id.value(), "progress row for unknown work"),
                Err(err) => warn!(error = %err, "failed to load work for progress row"),
            }
        }
        recent
    }

    /// Latest row per work for list views.
    ///
    /// Rows stored with one page or none display
    /// [`lit_core::reconcile::LEGACY_DISPLAY_TOTAL_PAGES`] pages.
    pub async fn progress_list(&self, user_id: UserId) -> Vec<ProgressListItem> {
        let records = self.list_progress(user_id).await;
        let titles: HashMap<WorkId, String> = match self.catalog.list_works(None).await {
            Ok(works) => works
                .into_iter()
                .map(|w| (w.work.id(), w.work.title().to_owned()))
                .collect(),
            Err(err) => {
                warn!(error = %err, "failed to list works for progress titles");
                HashMap::new()
            }
        };

        dedup_latest(&records)
            .into_iter()
            .map(|record| ProgressListItem {
                title: titles.get(&record.work_id).cloned(),
                display_total_pages: legacy_display_total_pages(record.total_pages),
                display_percentage: legacy_display_percentage(&record),
                record,
            })
            .collect()
    }

    // ─── Writes ────────────────────────────────────────────────────────────

    /// Record that the user is on `page` of `total_pages`.
    ///
    /// With a known total the newest row is updated (or one inserted) in a
    /// single repository call. With `total_pages == 0` only an existing row
    /// is touched; `Ok(None)` means nothing was written.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Progress` for a page outside the work
    /// and `ProgressServiceError::Storage` if the write fails.
    pub async fn record_page(
        &self,
        user_id: UserId,
        work_id: WorkId,
        page: u32,
        total_pages: u32,
    ) -> Result<Option<ProgressRecord>, ProgressServiceError> {
        self.cache_page(work_id, page);
        let now = self.clock.now();

        if total_pages == 0 {
            return self.touch_existing(user_id, work_id, page, now).await;
        }

        let update = ProgressUpdate::checked(page, total_pages, now)?;
        let row = self
            .progress
            .upsert_latest(user_id, work_id, update)
            .await?;
        info!(
            user = user_id.value(),
            work = work_id.value(),
            page,
            total_pages,
            completed = row.completed,
            "progress saved"
        );
        Ok(Some(row))
    }

    /// Read-then-write variant of [`ProgressService::record_page`].
    ///
    /// Two concurrent calls for a (user, work) pair without rows can both
    /// miss and insert two rows. Readers still see one position because
    /// reconciliation keeps the newest.
    ///
    /// # Errors
    ///
    /// Same as [`ProgressService::record_page`].
    pub async fn record_page_legacy(
        &self,
        user_id: UserId,
        work_id: WorkId,
        page: u32,
        total_pages: u32,
    ) -> Result<Option<ProgressRecord>, ProgressServiceError> {
        self.cache_page(work_id, page);
        let now = self.clock.now();

        if total_pages == 0 {
            return self.touch_existing(user_id, work_id, page, now).await;
        }

        let update = ProgressUpdate::checked(page, total_pages, now)?;
        let records = self.progress.list_for_user(user_id).await?;
        let row = match latest_for_work(&records, work_id) {
            Some(latest) => self.progress.update(latest.id, update.into()).await?,
            None => {
                self.progress
                    .create(NewProgressRecord {
                        user_id,
                        work_id,
                        update,
                    })
                    .await?
            }
        };
        info!(
            user = user_id.value(),
            work = work_id.value(),
            page,
            total_pages,
            "progress saved (legacy path)"
        );
        Ok(Some(row))
    }

    fn cache_page(&self, work_id: WorkId, page: u32) {
        if let Err(err) = self.cache.set_page(work_id, page) {
            warn!(work = work_id.value(), error = %err, "failed to cache page");
        }
    }

    async fn touch_existing(
        &self,
        user_id: UserId,
        work_id: WorkId,
        page: u32,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<ProgressRecord>, ProgressServiceError> {
        let records = self.progress.list_for_user(user_id).await?;
        let Some(latest) = latest_for_work(&records, work_id) else {
            debug!(work = work_id.value(), "no pages and no row, skipping write");
            return Ok(None);
        };
        let update = ProgressUpdate::at_page(page, 0, now);
        let row = self.progress.update(latest.id, update.into()).await?;
        Ok(Some(row))
    }
}
