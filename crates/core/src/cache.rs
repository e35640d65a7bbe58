//! Client-side cache provider.
//!
//! The reader keeps a few values locally so it can work before (or without)
//! the server: the last page per work, font settings, and the last
//! recommendation query. Everything that needs them takes a `ReadingCache`
//! instead of reaching for global state.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Recommendation, WorkId};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error("cache lock poisoned")]
    Poisoned,

    #[error("cache io error: {0}")]
    Io(String),

    #[error("cache serialization error: {0}")]
    Serialization(String),
}

/// Typography preferences of the reader view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReaderPrefs {
    pub font_size: f32,
    pub line_height: f32,
}

impl Default for ReaderPrefs {
    fn default() -> Self {
        Self {
            font_size: 18.0,
            line_height: 1.6,
        }
    }
}

/// The last recommendation request and what came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastQuery {
    pub query: String,
    pub result: Recommendation,
}

/// Everything a cache holds. Also the on-disk shape of file-backed caches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    #[serde(default)]
    pub pages: BTreeMap<WorkId, u32>,
    #[serde(default)]
    pub prefs: Option<ReaderPrefs>,
    #[serde(default)]
    pub last_query: Option<LastQuery>,
}

pub trait ReadingCache: Send + Sync {
    fn page(&self, work_id: WorkId) -> Option<u32>;

    /// # Errors
    ///
    /// Returns `CacheError` if the value cannot be stored.
    fn set_page(&self, work_id: WorkId, page: u32) -> Result<(), CacheError>;

    fn prefs(&self) -> Option<ReaderPrefs>;

    /// # Errors
    ///
    /// Returns `CacheError` if the value cannot be stored.
    fn set_prefs(&self, prefs: ReaderPrefs) -> Result<(), CacheError>;

    fn last_query(&self) -> Option<LastQuery>;

    /// # Errors
    ///
    /// Returns `CacheError` if the value cannot be stored.
    fn set_last_query(&self, last: LastQuery) -> Result<(), CacheError>;
}

/// Process-local cache, used in tests and by hosts without persistent storage.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    state: Mutex<CacheSnapshot>,
}

impl InMemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, f: impl FnOnce(&mut CacheSnapshot)) -> Result<(), CacheError> {
        let mut guard = self.state.lock().map_err(|_| CacheError::Poisoned)?;
        f(&mut guard);
        Ok(())
    }
}

impl ReadingCache for InMemoryCache {
    fn page(&self, work_id: WorkId) -> Option<u32> {
        self.state.lock().ok()?.pages.get(&work_id).copied()
    }

    fn set_page(&self, work_id: WorkId, page: u32) -> Result<(), CacheError> {
        self.update(|s| {
            s.pages.insert(work_id, page);
        })
    }

    fn prefs(&self) -> Option<ReaderPrefs> {
        self.state.lock().ok()?.prefs
    }

    fn set_prefs(&self, prefs: ReaderPrefs) -> Result<(), CacheError> {
        self.update(|s| s.prefs = Some(prefs))
    }

    fn last_query(&self) -> Option<LastQuery> {
        self.state.lock().ok()?.last_query.clone()
    }

    fn set_last_query(&self, last: LastQuery) -> Result<(), CacheError> {
        self.update(|s| s.last_query = Some(last))
    }
}
