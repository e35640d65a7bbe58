use std::sync::Arc;

use tracing::{debug, warn};

use lit_core::cache::ReaderPrefs;
use lit_core::model::{ProgressError, UserId, WorkId, WorkWithAuthor};
use lit_core::pagination::{
    LayoutSettings, Pagination, ParagraphMeasure, Paginator, reconcile_total_pages,
};
use lit_core::reconcile::{ProgressSource, ProgressView, percentage};
use storage::repository::CatalogRepository;

use crate::error::{ProgressServiceError, ReaderError};
use crate::progress_service::ProgressService;

pub type BoxedMeasure = Box<dyn ParagraphMeasure + Send + Sync>;

/// Opens reader sessions.
#[derive(Clone)]
pub struct ReaderService {
    catalog: Arc<dyn CatalogRepository>,
    progress: Arc<ProgressService>,
}

impl ReaderService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>, progress: Arc<ProgressService>) -> Self {
        Self { catalog, progress }
    }

    /// # Errors
    ///
    /// See [`ReaderSession::open`].
    pub async fn open(
        &self,
        user_id: UserId,
        work_id: WorkId,
        layout: LayoutSettings,
        measure: BoxedMeasure,
    ) -> Result<ReaderSession, ReaderError> {
        ReaderSession::open(
            self.catalog.as_ref(),
            Arc::clone(&self.progress),
            user_id,
            work_id,
            layout,
            measure,
        )
        .await
    }
}

/// One user reading one work: pagination plus the current page.
pub struct ReaderSession {
    progress: Arc<ProgressService>,
    user_id: UserId,
    work: WorkWithAuthor,
    layout: LayoutSettings,
    measure: BoxedMeasure,
    paginator: Paginator,
    pagination: Pagination,
    total_pages: u32,
    current_page: u32,
    resumed: ProgressView,
}

impl ReaderSession {
    /// Load the work, wait for the user's progress, paginate and resume.
    ///
    /// The total is the larger of the fresh estimate and the persisted
    /// count. A resumed page past that total restarts at page 1.
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::WorkNotFound` for an unknown work and
    /// `ReaderError::Storage` if the catalog lookup fails.
    pub async fn open(
        catalog: &dyn CatalogRepository,
        progress: Arc<ProgressService>,
        user_id: UserId,
        work_id: WorkId,
        layout: LayoutSettings,
        measure: BoxedMeasure,
    ) -> Result<Self, ReaderError> {
        let work = catalog
            .get_work(work_id)
            .await?
            .ok_or(ReaderError::WorkNotFound(work_id))?;
        let view = progress.progress_for(user_id, work_id).await;

        let mut paginator = Paginator::new();
        let pagination = paginator.paginate(&work.work, &layout, measure.as_ref()).clone();
        let persisted = view.record.as_ref().map(|r| r.total_pages);
        let total_pages = reconcile_total_pages(pagination.total_pages(), persisted);
        let view = view.with_known_total(total_pages);

        let mut current_page = view.current_page.max(1);
        if current_page > total_pages {
            debug!(
                work = work_id.value(),
                current_page, total_pages, "saved page past the end, restarting"
            );
            current_page = 1;
        }
        debug!(
            work = work_id.value(),
            estimate = pagination.total_pages(),
            ?persisted,
            total_pages,
            current_page,
            "reader opened"
        );

        Ok(Self {
            progress,
            user_id,
            work,
            layout,
            measure,
            paginator,
            pagination,
            total_pages,
            current_page,
            resumed: view,
        })
    }

    #[must_use]
    pub fn work(&self) -> &WorkWithAuthor {
        &self.work
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        percentage(self.current_page, self.total_pages)
    }

    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.current_page >= self.total_pages
    }

    /// Where the starting page came from.
    #[must_use]
    pub fn resumed_from(&self) -> ProgressSource {
        self.resumed.source
    }

    /// The saved position the session started from, measured against the
    /// reconciled total.
    #[must_use]
    pub fn resumed(&self) -> &ProgressView {
        &self.resumed
    }

    /// True when the work has no text and the single page is a placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.pagination.is_placeholder()
    }

    #[must_use]
    pub fn layout(&self) -> LayoutSettings {
        self.layout
    }

    /// How many times the text has been laid out in this session.
    #[must_use]
    pub fn layout_runs(&self) -> u32 {
        self.paginator.runs()
    }

    /// Paragraphs on the current page. Empty when the persisted total runs
    /// past the pages this layout produced.
    #[must_use]
    pub fn current_paragraphs(&self) -> &[String] {
        self.pagination.page(self.current_page).unwrap_or(&[])
    }

    /// # Errors
    ///
    /// Returns `ReaderError::Progress` if the write fails; the page still moves.
    pub async fn next_page(&mut self) -> Result<u32, ReaderError> {
        if self.current_page >= self.total_pages {
            return Ok(self.current_page);
        }
        self.go_to(self.current_page + 1).await
    }

    /// # Errors
    ///
    /// Returns `ReaderError::Progress` if the write fails; the page still moves.
    pub async fn previous_page(&mut self) -> Result<u32, ReaderError> {
        if self.current_page <= 1 {
            return Ok(self.current_page);
        }
        self.go_to(self.current_page - 1).await
    }

    /// Jump to a 1-based page and record it.
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::Progress` for a page outside `1..=total_pages`
    /// or when the write fails. Failed writes are not retried.
    pub async fn go_to(&mut self, page: u32) -> Result<u32, ReaderError> {
        if page == 0 || page > self.total_pages {
            return Err(ProgressServiceError::from(ProgressError::PageOutOfRange {
                page,
                total: self.total_pages,
            })
            .into());
        }
        if page == self.current_page {
            return Ok(page);
        }
        self.current_page = page;
        self.progress
            .record_page(self.user_id, self.work.work.id(), page, self.total_pages)
            .await?;
        Ok(page)
    }

    /// Lay the text out again for new typography or viewport.
    ///
    /// The total never drops below the one already in use and the current
    /// page stays within it. Returns the new total.
    pub fn relayout(&mut self, layout: LayoutSettings) -> u32 {
        self.layout = layout;
        self.pagination = self
            .paginator
            .paginate(&self.work.work, &layout, self.measure.as_ref())
            .clone();
        self.total_pages =
            reconcile_total_pages(self.pagination.total_pages(), Some(self.total_pages));
        self.current_page = self.current_page.clamp(1, self.total_pages.max(1));

        let prefs = ReaderPrefs {
            font_size: layout.font_size(),
            line_height: layout.line_height(),
        };
        if let Err(err) = self.progress.cache().set_prefs(prefs) {
            warn!(error = %err, "failed to cache reader preferences");
        }
        self.total_pages
    }
}
