//! Score formulas for the fixed-answer games.

use serde::Serialize;
use thiserror::Error;

/// Questions drawn for one author-guessing round.
pub const AUTHOR_QUIZ_QUESTIONS: usize = 10;

/// Score never drops below this floor for a solved puzzle.
pub const PUZZLE_MIN_SCORE: u32 = 10;
pub const PUZZLE_MAX_SCORE: u32 = 100;
pub const PUZZLE_ATTEMPT_PENALTY: u32 = 5;
pub const PUZZLE_HINT_PENALTY: u32 = 10;

/// Points lost for every crossword cell revealed instead of typed.
pub const CROSSWORD_REVEAL_PENALTY: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("correct answers ({correct}) exceed question count ({total})")]
    TooManyCorrect { correct: u32, total: u32 },
}

/// `round(correct / total * 100)`; zero questions scores zero.
///
/// # Errors
///
/// Returns `ScoringError::TooManyCorrect` if `correct > total`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn author_quiz_percentage(correct: u32, total: u32) -> Result<u32, ScoringError> {
    if correct > total {
        return Err(ScoringError::TooManyCorrect { correct, total });
    }
    if total == 0 {
        return Ok(0);
    }
    Ok((f64::from(correct) / f64::from(total) * 100.0).round() as u32)
}

/// Result band of an author-guessing round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Excellent,
    VeryGood,
    NotBad,
    KeepReading,
}

impl ScoreTier {
    /// Band for an exact (unrounded) share of correct answers.
    #[must_use]
    pub fn for_answers(correct: u32, total: u32) -> Self {
        if total == 0 {
            return Self::KeepReading;
        }
        let scaled = u64::from(correct) * 100;
        let total = u64::from(total);
        if scaled >= 90 * total {
            Self::Excellent
        } else if scaled >= 70 * total {
            Self::VeryGood
        } else if scaled >= 50 * total {
            Self::NotBad
        } else {
            Self::KeepReading
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very good",
            Self::NotBad => "Not bad",
            Self::KeepReading => "Keep reading",
        }
    }

    #[must_use]
    pub fn feedback(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent! You are a true connoisseur of Ukrainian literature!",
            Self::VeryGood => "Very good! You know Ukrainian authors well.",
            Self::NotBad => "Not bad! There is room to improve.",
            Self::KeepReading => "Worth reading more Ukrainian literature.",
        }
    }
}

/// `max(10, 100 - 5 * attempts - 10 * hints)`, capped at 100.
#[must_use]
pub fn quote_puzzle_score(attempts: u32, hints: u32) -> u32 {
    let penalty = attempts
        .saturating_mul(PUZZLE_ATTEMPT_PENALTY)
        .saturating_add(hints.saturating_mul(PUZZLE_HINT_PENALTY));
    PUZZLE_MAX_SCORE
        .saturating_sub(penalty)
        .clamp(PUZZLE_MIN_SCORE, PUZZLE_MAX_SCORE)
}

/// `max(10, 100 - 5 * revealed_cells)` for a completed crossword.
#[must_use]
pub fn crossword_score(revealed_cells: u32) -> u32 {
    PUZZLE_MAX_SCORE
        .saturating_sub(revealed_cells.saturating_mul(CROSSWORD_REVEAL_PENALTY))
        .max(PUZZLE_MIN_SCORE)
}
