mod ids;
mod progress;
mod quiz;
mod recommendation;
mod result;
mod work;

pub use ids::{AuthorId, ParseIdError, ProgressId, QuizId, ResultId, UserId, WorkId};

pub use progress::{ProgressError, ProgressPatch, ProgressRecord, ProgressUpdate};
pub use quiz::{Difficulty, Quiz, QuizError, QuizFilter, QuizType};
pub use recommendation::{Recommendation, TextAnalysis};
pub use result::{GAME_MAX_SCORE, GAME_SENTINEL_ID, GameKind, NewTestResult, TestRef, TestResult};
pub use work::{Author, Category, Work, WorkDraft, WorkError, WorkWithAuthor};
