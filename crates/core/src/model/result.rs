use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{QuizId, ResultId, UserId};

/// Raw test id stored for ad-hoc game results.
pub const GAME_SENTINEL_ID: u64 = 0;

/// Max score recorded for every game.
pub const GAME_MAX_SCORE: u32 = 100;

/// What a result row was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestRef {
    Quiz(QuizId),
    Game,
}

impl TestRef {
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        if raw == GAME_SENTINEL_ID {
            TestRef::Game
        } else {
            TestRef::Quiz(QuizId::new(raw))
        }
    }

    #[must_use]
    pub fn to_raw(self) -> u64 {
        match self {
            TestRef::Quiz(id) => id.value(),
            TestRef::Game => GAME_SENTINEL_ID,
        }
    }

    #[must_use]
    pub fn is_game(self) -> bool {
        matches!(self, TestRef::Game)
    }
}

/// Built-in games, plus anything a client reports by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameKind {
    GuessAuthor,
    QuotePuzzle,
    Crossword,
    Other(String),
}

impl GameKind {
    /// Parse the game type a client reports.
    #[must_use]
    pub fn from_type(game_type: &str) -> Self {
        match game_type.trim() {
            "guess-author-game" | "guess-author" => GameKind::GuessAuthor,
            "quote-puzzle" => GameKind::QuotePuzzle,
            "literary-crossword" | "crossword" => GameKind::Crossword,
            other => GameKind::Other(other.to_owned()),
        }
    }

    /// Title stored on the result row.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            GameKind::GuessAuthor => "Game: Guess the Author".to_owned(),
            GameKind::QuotePuzzle => "Game: Quote Puzzle".to_owned(),
            GameKind::Crossword => "Game: Literary Crossword".to_owned(),
            GameKind::Other(name) => format!("Game: {name}"),
        }
    }
}

/// Persisted outcome of a quiz or a game play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: ResultId,
    pub user_id: UserId,
    pub test: TestRef,
    pub score: u32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
    pub title: Option<String>,
    pub max_score: Option<u32>,
}

/// A result row before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTestResult {
    pub user_id: UserId,
    pub test: TestRef,
    pub score: u32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
    pub title: Option<String>,
    pub max_score: Option<u32>,
}

impl NewTestResult {
    /// A finished game play, stored under the sentinel test id.
    #[must_use]
    pub fn game(
        user_id: UserId,
        kind: &GameKind,
        score: u32,
        metadata: Option<serde_json::Value>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            test: TestRef::Game,
            score: score.min(GAME_MAX_SCORE),
            completed: true,
            completed_at: Some(completed_at),
            metadata,
            title: Some(kind.title()),
            max_score: Some(GAME_MAX_SCORE),
        }
    }

    #[must_use]
    pub fn assign_id(self, id: ResultId) -> TestResult {
        TestResult {
            id,
            user_id: self.user_id,
            test: self.test,
            score: self.score,
            completed: self.completed,
            completed_at: self.completed_at,
            metadata: self.metadata,
            title: self.title,
            max_score: self.max_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn sentinel_round_trips_through_raw() {
        assert_eq!(TestRef::from_raw(0), TestRef::Game);
        assert_eq!(TestRef::from_raw(9), TestRef::Quiz(QuizId::new(9)));
        assert_eq!(TestRef::Game.to_raw(), 0);
    }

    #[test]
    fn game_titles() {
        assert_eq!(GameKind::from_type("guess-author-game").title(), "Game: Guess the Author");
        assert_eq!(GameKind::from_type("quote-puzzle").title(), "Game: Quote Puzzle");
        assert_eq!(GameKind::from_type("crossword").title(), "Game: Literary Crossword");
        assert_eq!(GameKind::from_type("word-chain").title(), "Game: word-chain");
    }

    #[test]
    fn game_result_uses_sentinel_and_caps_score() {
        let result = NewTestResult::game(
            UserId::new(1),
            &GameKind::QuotePuzzle,
            140,
            None,
            fixed_now(),
        );
        assert!(result.test.is_game());
        assert_eq!(result.score, 100);
        assert_eq!(result.max_score, Some(GAME_MAX_SCORE));
        assert!(result.completed);
    }
}
