//! JSON file implementation of the reader's local cache.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lit_core::cache::{CacheError, CacheSnapshot, LastQuery, ReaderPrefs, ReadingCache};
use lit_core::model::WorkId;
use tracing::warn;

/// Cache persisted to a single JSON file, rewritten on every change.
///
/// A change becomes visible to readers only after the file was replaced.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    state: Mutex<CacheSnapshot>,
    // Serializes writers; `state` is never held across file I/O.
    writer: Mutex<()>,
}

impl FileCache {
    /// Open the cache file, starting empty when it does not exist or cannot
    /// be parsed.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let snapshot = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "discarding unreadable cache file");
                CacheSnapshot::default()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => CacheSnapshot::default(),
            Err(err) => return Err(CacheError::Io(err.to_string())),
        };
        Ok(Self {
            path,
            state: Mutex::new(snapshot),
            writer: Mutex::new(()),
        })
    }

    fn update(&self, f: impl FnOnce(&mut CacheSnapshot)) -> Result<(), CacheError> {
        let _writing = self.writer.lock().map_err(|_| CacheError::Poisoned)?;
        let mut next = self
            .state
            .lock()
            .map_err(|_| CacheError::Poisoned)?
            .clone();
        f(&mut next);

        let json = serde_json::to_string_pretty(&next)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        write_atomically(&self.path, &json)?;

        *self.state.lock().map_err(|_| CacheError::Poisoned)? = next;
        Ok(())
    }
}

fn write_atomically(path: &Path, json: &str) -> Result<(), CacheError> {
    let io = |e: std::io::Error| CacheError::Io(e.to_string());
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).map_err(io)?;
    fs::rename(&tmp, path).map_err(io)
}

impl ReadingCache for FileCache {
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
