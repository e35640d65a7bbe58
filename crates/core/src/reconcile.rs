//! Resolves persisted progress rows and the local cache into one view.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Category, ProgressId, ProgressRecord, Work, WorkId};
use crate::time::or_epoch;

/// Total pages displayed for legacy rows that stored one page or none.
///
/// Migration shim for rows written before pagination existed. Only list
/// views use it; the value is never written back.
pub const LEGACY_DISPLAY_TOTAL_PAGES: u32 = 11;

/// `round(current / total * 100)`, clamped to 0..=100. Zero pages is 0 %.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percentage(current_page: u32, total_pages: u32) -> u8 {
    if total_pages == 0 {
        return 0;
    }
    let ratio = f64::from(current_page) / f64::from(total_pages) * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}

/// A work is completed exactly when the reader is on its last page.
#[must_use]
pub fn is_completed(current_page: u32, total_pages: u32) -> bool {
    total_pages > 0 && current_page == total_pages
}

/// Where a reconciled position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressSource {
    Persisted,
    LocalCache,
    NotStarted,
}

/// The single authoritative reading position for a (user, work) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    pub work_id: WorkId,
    pub current_page: u32,
    /// Zero when nothing is known about the work's length yet.
    pub total_pages: u32,
    pub percentage: u8,
    pub completed: bool,
    pub source: ProgressSource,
    /// The row this view was built from, if any.
    pub record: Option<ProgressRecord>,
}

impl ProgressView {
    #[must_use]
    pub fn not_started(work_id: WorkId) -> Self {
        Self {
            work_id,
            current_page: 0,
            total_pages: 0,
            percentage: 0,
            completed: false,
            source: ProgressSource::NotStarted,
            record: None,
        }
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.source != ProgressSource::NotStarted
    }

    /// Fill in the total for a cache-sourced view once pagination knows it.
    #[must_use]
    pub fn with_known_total(mut self, total_pages: u32) -> Self {
        if self.source == ProgressSource::LocalCache {
            self.total_pages = total_pages;
            self.percentage = percentage(self.current_page, total_pages);
            self.completed = is_completed(self.current_page, total_pages);
        }
        self
    }
}

/// Recency order shared with `ProgressRepository::upsert_latest`:
/// `last_read_at` (missing sorts as epoch), then the higher id.
#[must_use]
pub fn recency_key(record: &ProgressRecord) -> (DateTime<Utc>, ProgressId) {
    (or_epoch(record.last_read_at), record.id)
}

/// Most recent row for `work_id` by [`recency_key`].
#[must_use]
pub fn latest_for_work(records: &[ProgressRecord], work_id: WorkId) -> Option<&ProgressRecord> {
    records
        .iter()
        .filter(|r| r.work_id == work_id)
        .max_by_key(|r| recency_key(r))
}

/// Resolve one work's position from all of a user's rows and the locally
/// cached page.
#[must_use]
pub fn reconcile(
    records: &[ProgressRecord],
    work_id: WorkId,
    cached_page: Option<u32>,
) -> ProgressView {
    if let Some(record) = latest_for_work(records, work_id) {
        return ProgressView {
            work_id,
            current_page: record.current_page,
            total_pages: record.total_pages,
            percentage: percentage(record.current_page, record.total_pages),
            completed: record.completed,
            source: ProgressSource::Persisted,
            record: Some(record.clone()),
        };
    }

    match cached_page {
        Some(page) if page > 0 => ProgressView {
            work_id,
            current_page: page,
            total_pages: 0,
            percentage: 0,
            completed: false,
            source: ProgressSource::LocalCache,
            record: None,
        },
        _ => ProgressView::not_started(work_id),
    }
}

/// One row per work, the most recent one, ordered newest first.
#[must_use]
pub fn dedup_latest(records: &[ProgressRecord]) -> Vec<ProgressRecord> {
    let mut sorted: Vec<&ProgressRecord> = records.iter().collect();
    sorted.sort_by_key(|r| std::cmp::Reverse(recency_key(r)));

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|r| seen.insert(r.work_id))
        .cloned()
        .collect()
}

/// Completed curriculum works out of all curriculum works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReadingStats {
    pub read: u32,
    pub total: u32,
    pub percentage: u8,
}

/// Count how many `zno` works the user has completed, by their latest row.
#[must_use]
pub fn reading_stats(records: &[ProgressRecord], works: &[Work]) -> ReadingStats {
    let curriculum: HashSet<WorkId> = works
        .iter()
        .filter(|w| w.is_in(Category::Zno))
        .map(Work::id)
        .collect();
    let read = dedup_latest(records)
        .iter()
        .filter(|r| r.completed && curriculum.contains(&r.work_id))
        .count();

    let read = u32::try_from(read).unwrap_or(u32::MAX);
    let total = u32::try_from(curriculum.len()).unwrap_or(u32::MAX);
    ReadingStats {
        read,
        total,
        percentage: percentage(read, total),
    }
}

/// Uncompleted works, most recently read first, one row per work.
#[must_use]
pub fn in_progress(records: &[ProgressRecord], limit: usize) -> Vec<ProgressRecord> {
    dedup_latest(records)
        .into_iter()
        .filter(|r| !r.completed)
        .take(limit)
        .collect()
}

/// Total pages to show for a row in list views.
#[must_use]
pub fn legacy_display_total_pages(total_pages: u32) -> u32 {
    if total_pages <= 1 {
        LEGACY_DISPLAY_TOTAL_PAGES
    } else {
        total_pages
    }
}

/// Percentage to show for a row in list views, using the legacy total.
#[must_use]
pub fn legacy_display_percentage(record: &ProgressRecord) -> u8 {
    if record.total_pages == 0 {
        return 0;
    }
    percentage(
        record.current_page,
        legacy_display_total_pages(record.total_pages),
    )
}
