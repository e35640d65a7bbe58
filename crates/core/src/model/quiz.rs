use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuizId, WorkId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz id 0 is reserved for game results")]
    ReservedId,

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("unknown quiz type: {0}")]
    UnknownType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(QuizError::UnknownDifficulty(other.to_owned())),
        }
    }
}

/// What a quiz asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizType {
    Book,
    Quote,
    Character,
}

impl QuizType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizType::Book => "book",
            QuizType::Quote => "quote",
            QuizType::Character => "character",
        }
    }
}

impl fmt::Display for QuizType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizType {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(QuizType::Book),
            "quote" => Ok(QuizType::Quote),
            "character" => Ok(QuizType::Character),
            other => Err(QuizError::UnknownType(other.to_owned())),
        }
    }
}

/// A catalog quiz. Questions themselves are described in free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    pub work_id: Option<WorkId>,
    pub question_count: u32,
    pub difficulty: Difficulty,
    pub quiz_type: QuizType,
    pub special_icon: Option<String>,
    pub questions: Option<String>,
    /// Estimated time in minutes.
    pub time_minutes: Option<u32>,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns `QuizError::ReservedId` for id 0 and `QuizError::EmptyTitle`
    /// for a blank title.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        work_id: Option<WorkId>,
        question_count: u32,
        difficulty: Difficulty,
        quiz_type: QuizType,
    ) -> Result<Self, QuizError> {
        if id.value() == 0 {
            return Err(QuizError::ReservedId);
        }
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            work_id,
            question_count,
            difficulty,
            quiz_type,
            special_icon: None,
            questions: None,
            time_minutes: None,
        })
    }
}

/// Optional narrowing for quiz listings. Type wins over work when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuizFilter {
    pub quiz_type: Option<QuizType>,
    pub work_id: Option<WorkId>,
}

impl QuizFilter {
    #[must_use]
    pub fn by_type(quiz_type: QuizType) -> Self {
        Self {
            quiz_type: Some(quiz_type),
            work_id: None,
        }
    }

    #[must_use]
    pub fn by_work(work_id: WorkId) -> Self {
        Self {
            quiz_type: None,
            work_id: Some(work_id),
        }
    }

    #[must_use]
    pub fn matches(&self, quiz: &Quiz) -> bool {
        match (self.quiz_type, self.work_id) {
            (Some(kind), _) => quiz.quiz_type == kind,
            (None, Some(work)) => quiz.work_id == Some(work),
            (None, None) => true,
        }
    }
}
