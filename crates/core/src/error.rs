use thiserror::Error;

use crate::cache::CacheError;
use crate::games::{AuthorQuizError, CrosswordError, PuzzleError};
use crate::model::{ParseIdError, ProgressError, QuizError, WorkError};
use crate::pagination::PaginationError;
use crate::scoring::ScoringError;

/// Any domain error, for callers that do not care which rule failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Work(#[from] WorkError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    AuthorQuiz(#[from] AuthorQuizError),
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
    #[error(transparent)]
    Crossword(#[from] CrosswordError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}
