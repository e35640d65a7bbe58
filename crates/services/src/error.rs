//! Shared error types for the services crate.

use thiserror::Error;

use lit_core::cache::CacheError;
use lit_core::games::{AuthorQuizError, CrosswordError, PuzzleError};
use lit_core::model::{ProgressError, QuizId, WorkId};
use lit_core::pagination::PaginationError;
use storage::repository::StorageError;
use storage::seed::SeedError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `RecommendationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecommendationError {
    #[error("recommendations are not configured")]
    Disabled,
    #[error("query is empty")]
    EmptyQuery,
    #[error("recommendation service returned an empty response")]
    EmptyResponse,
    #[error("recommendation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed recommendation payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ReaderSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReaderError {
    #[error("work {0} not found")]
    WorkNotFound(WorkId),
    #[error(transparent)]
    Layout(#[from] PaginationError),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResultService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultServiceError {
    #[error("quiz {0} not found")]
    QuizNotFound(QuizId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `GamesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GamesError {
    #[error("no puzzle quote with id {0}")]
    UnknownQuote(u64),
    #[error("game is not finished yet")]
    NotFinished,
    #[error(transparent)]
    AuthorQuiz(#[from] AuthorQuizError),
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
    #[error(transparent)]
    Crossword(#[from] CrosswordError),
    #[error(transparent)]
    Results(#[from] ResultServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while loading `LitConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("invalid recommendation base url: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
