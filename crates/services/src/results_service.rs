use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use lit_core::model::{GameKind, NewTestResult, QuizId, TestRef, TestResult, UserId};
use lit_core::time::or_epoch;
use storage::repository::{CatalogRepository, ResultRepository};

use crate::Clock;
use crate::error::ResultServiceError;

/// Max score shown for quiz rows whose quiz is unknown.
pub const DEFAULT_QUIZ_MAX_SCORE: u32 = 20;

/// Records quiz and game outcomes and lists them for the profile view.
#[derive(Clone)]
pub struct ResultService {
    clock: Clock,
    results: Arc<dyn ResultRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl ResultService {
    #[must_use]
    pub fn new(
        clock: Clock,
        results: Arc<dyn ResultRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            clock,
            results,
            catalog,
        }
    }

    /// Store one play of a game as a new row under the sentinel test id.
    ///
    /// # Errors
    ///
    /// Returns `ResultServiceError::Storage` if the write fails.
    pub async fn record_game(
        &self,
        user_id: UserId,
        kind: &GameKind,
        score: u32,
        metadata: Option<serde_json::Value>,
    ) -> Result<TestResult, ResultServiceError> {
        let row = self
            .results
            .create(NewTestResult::game(
                user_id,
                kind,
                score,
                metadata,
                self.clock.now(),
            ))
            .await?;
        info!(user = user_id.value(), game = %kind.title(), score = row.score, "game result saved");
        Ok(row)
    }

    /// Store a finished catalog quiz.
    ///
    /// # Errors
    ///
    /// Returns `ResultServiceError::QuizNotFound` for an unknown quiz and
    /// `ResultServiceError::Storage` if a lookup or the write fails.
    pub async fn record_quiz(
        &self,
        user_id: UserId,
        quiz_id: QuizId,
        score: u32,
    ) -> Result<TestResult, ResultServiceError> {
        let quiz = self
            .catalog
            .get_quiz(quiz_id)
            .await?
            .ok_or(ResultServiceError::QuizNotFound(quiz_id))?;
        let row = self
            .results
            .create(NewTestResult {
                user_id,
                test: TestRef::Quiz(quiz_id),
                score: score.min(quiz.question_count),
                completed: true,
                completed_at: Some(self.clock.now()),
                metadata: None,
                title: Some(quiz.title),
                max_score: Some(quiz.question_count),
            })
            .await?;
        info!(user = user_id.value(), quiz = quiz_id.value(), score = row.score, "quiz result saved");
        Ok(row)
    }

    /// All results, newest first, with title and max score filled in from
    /// the catalog where the row lacks them.
    ///
    /// Storage failures degrade to an empty list.
    pub async fn list_results(&self, user_id: UserId) -> Vec<TestResult> {
        let mut rows = match self.results.list_for_user(user_id).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(user = user_id.value(), error = %err, "failed to list results");
                return Vec::new();
            }
        };

        let mut quizzes = HashMap::new();
        for row in &mut rows {
            let TestRef::Quiz(quiz_id) = row.test else {
                continue;
            };
            if row.title.is_some() && row.max_score.is_some() {
                continue;
            }
            if !quizzes.contains_key(&quiz_id) {
                let quiz = self.catalog.get_quiz(quiz_id).await.unwrap_or_else(|err| {
                    warn!(quiz = quiz_id.value(), error = %err, "failed to load quiz");
                    None
                });
                quizzes.insert(quiz_id, quiz);
            }
            let quiz = quizzes.get(&quiz_id).and_then(Option::as_ref);
            if row.title.is_none() {
                row.title = quiz.map(|q| q.title.clone());
            }
            if row.max_score.is_none() {
                row.max_score = Some(quiz.map_or(DEFAULT_QUIZ_MAX_SCORE, |q| q.question_count));
            }
        }

        // Stable: rows with equal times keep insertion order.
        rows.sort_by(|a, b| or_epoch(b.completed_at).cmp(&or_epoch(a.completed_at)));
        rows
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use lit_core::time::fixed_now;
    use storage::repository::InMemoryRepository;
    use storage::seed::seed_catalog;

    use super::*;

    async fn seeded() -> (Arc<InMemoryRepository>, ResultService) {
        let repo = Arc::new(InMemoryRepository::new());
        seed_catalog(repo.as_ref()).await.unwrap();
        let service = ResultService::new(Clock::fixed(fixed_now()), repo.clone(), repo.clone());
        (repo, service)
    }

    #[tokio::test]
    async fn every_game_play_is_a_new_row() {
        let (_repo, service) = seeded().await;
        let user = UserId::new(2);
        let first = service
            .record_game(user, &GameKind::GuessAuthor, 70, None)
            .await
            .unwrap();
        let second = service
            .record_game(user, &GameKind::GuessAuthor, 90, None)
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(service.list_results(user).await.len(), 2);
    }

    #[tokio::test]
    async fn listing_fills_quiz_details_and_sorts_newest_first() {
        let (repo, service) = seeded().await;
        let user = UserId::new(4);
        let now = fixed_now();
        let bare = |quiz: u64, at| NewTestResult {
            user_id: user,
            test: TestRef::Quiz(QuizId::new(quiz)),
            score: 5,
            completed: true,
            completed_at: Some(at),
            metadata: None,
            title: None,
            max_score: None,
        };
        ResultRepository::create(repo.as_ref(), bare(3, now - Duration::days(2)))
            .await
            .unwrap();
        ResultRepository::create(repo.as_ref(), bare(404, now - Duration::days(1)))
            .await
            .unwrap();
        service
            .record_game(user, &GameKind::QuotePuzzle, 80, None)
            .await
            .unwrap();

        let rows = service.list_results(user).await;
        assert_eq!(rows.len(), 3);
        assert!(rows[0].test.is_game());
        assert_eq!(rows[1].max_score, Some(DEFAULT_QUIZ_MAX_SCORE));
        assert_eq!(rows[1].title, None);
        assert_eq!(rows[2].max_score, Some(15));
        assert!(rows[2].title.is_some());
    }

    #[tokio::test]
    async fn unknown_quiz_cannot_be_recorded() {
        let (_repo, service) = seeded().await;
        let err = service
            .record_quiz(UserId::new(1), QuizId::new(404), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ResultServiceError::QuizNotFound(_)));

        let saved = service.record_quiz(UserId::new(1), QuizId::new(3), 40).await.unwrap();
        assert_eq!((saved.score, saved.max_score), (15, Some(15)));
    }
}
