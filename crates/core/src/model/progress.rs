use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ProgressId, UserId, WorkId};

/// Persisted reading position of a user in a work.
///
/// Several historical rows may exist for the same (user, work) pair; the one
/// with the latest `last_read_at` is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: ProgressId,
    pub user_id: UserId,
    pub work_id: WorkId,
    /// Whole percent, 0..=100.
    pub percentage: u8,
    pub current_page: u32,
    pub total_pages: u32,
    pub last_read_at: Option<DateTime<Utc>>,
    pub completed: bool,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("page {page} is outside 1..={total}")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("work has no pages")]
    NoPages,
}

/// Values written on every page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub percentage: u8,
    pub current_page: u32,
    pub total_pages: u32,
    pub last_read_at: DateTime<Utc>,
    pub completed: bool,
}

impl ProgressUpdate {
    /// Build an update for the given position, deriving percentage and
    /// completion from the page numbers.
    #[must_use]
    pub fn at_page(current_page: u32, total_pages: u32, now: DateTime<Utc>) -> Self {
        Self {
            percentage: crate::reconcile::percentage(current_page, total_pages),
            current_page,
            total_pages,
            last_read_at: now,
            completed: crate::reconcile::is_completed(current_page, total_pages),
        }
    }
}

impl ProgressUpdate {
    /// Like `at_page`, but rejects positions outside the work.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NoPages` for a zero total and
    /// `ProgressError::PageOutOfRange` for page 0 or a page past the end.
    pub fn checked(current_page: u32, total_pages: u32, now: DateTime<Utc>) -> Result<Self, ProgressError> {
        if total_pages == 0 {
            return Err(ProgressError::NoPages);
        }
        if current_page == 0 || current_page > total_pages {
            return Err(ProgressError::PageOutOfRange {
                page: current_page,
                total: total_pages,
            });
        }
        Ok(Self::at_page(current_page, total_pages, now))
    }
}

/// Partial update for an existing row; `None` leaves the column unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressPatch {
    pub percentage: Option<u8>,
    pub current_page: Option<u32>,
    pub total_pages: Option<u32>,
    pub last_read_at: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
}

impl From<ProgressUpdate> for ProgressPatch {
    fn from(update: ProgressUpdate) -> Self {
        Self {
            percentage: Some(update.percentage),
            current_page: Some(update.current_page),
            total_pages: Some(update.total_pages),
            last_read_at: Some(update.last_read_at),
            completed: Some(update.completed),
        }
    }
}

impl ProgressRecord {
    /// Apply a patch in place.
    pub fn apply(&mut self, patch: ProgressPatch) {
        if let Some(percentage) = patch.percentage {
            self.percentage = percentage.min(100);
        }
        if let Some(page) = patch.current_page {
            self.current_page = page;
        }
        if let Some(total) = patch.total_pages {
            self.total_pages = total;
        }
        if let Some(at) = patch.last_read_at {
            self.last_read_at = Some(at);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}
