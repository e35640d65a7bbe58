use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde_json::json;

use lit_core::games::{
    AuthorQuiz, Crossword, LITERARY_CROSSWORD, PUZZLE_QUOTES, QuotePuzzle, puzzle_quote,
    sample_round,
};
use lit_core::model::{GameKind, TestResult, UserId};
use storage::repository::CatalogRepository;

use crate::Clock;
use crate::error::GamesError;
use crate::results_service::ResultService;

/// Starts games from catalog data and saves their results.
#[derive(Clone)]
pub struct GamesService {
    clock: Clock,
    catalog: Arc<dyn CatalogRepository>,
    results: Arc<ResultService>,
}

impl GamesService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<dyn CatalogRepository>, results: Arc<ResultService>) -> Self {
        Self {
            clock,
            catalog,
            results,
        }
    }

    /// A new author-guessing round built from every quote in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `GamesError::AuthorQuiz` when the catalog has no quotes and
    /// `GamesError::Storage` if the catalog cannot be read.
    pub async fn author_round<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<AuthorQuiz, GamesError> {
        let works = self.catalog.list_works(None).await?;
        let questions = sample_round(&works, rng);
        Ok(AuthorQuiz::start(questions, self.clock.now())?)
    }

    /// Save a finished author round.
    ///
    /// # Errors
    ///
    /// Returns `GamesError::NotFinished` before the last answer and
    /// `GamesError::Results` if the write fails.
    pub async fn finish_author_round(
        &self,
        user_id: UserId,
        round: &AuthorQuiz,
    ) -> Result<TestResult, GamesError> {
        if !round.is_finished() {
            return Err(GamesError::NotFinished);
        }
        let summary = round.summary();
        let metadata = json!({
            "correct": summary.correct,
            "total": summary.total,
            "tier": summary.tier.label(),
        });
        Ok(self
            .results
            .record_game(user_id, &GameKind::GuessAuthor, summary.percentage, Some(metadata))
            .await?)
    }

    /// # Errors
    ///
    /// Returns `GamesError::UnknownQuote` for an id outside the quote set.
    pub fn puzzle<R: Rng + ?Sized>(&self, quote_id: u64, rng: &mut R) -> Result<QuotePuzzle, GamesError> {
        let quote = puzzle_quote(quote_id).ok_or(GamesError::UnknownQuote(quote_id))?;
        Ok(QuotePuzzle::new(quote.id, quote.text, rng)?)
    }

    /// # Errors
    ///
    /// Returns `GamesError::UnknownQuote` if no quotes are available.
    pub fn random_puzzle<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<QuotePuzzle, GamesError> {
        let quote = PUZZLE_QUOTES.choose(rng).ok_or(GamesError::UnknownQuote(0))?;
        Ok(QuotePuzzle::new(quote.id, quote.text, rng)?)
    }

    /// Save a solved puzzle.
    ///
    /// # Errors
    ///
    /// Returns `GamesError::NotFinished` while fragments are out of place and
    /// `GamesError::Results` if the write fails.
    pub async fn finish_puzzle(
        &self,
        user_id: UserId,
        puzzle: &QuotePuzzle,
    ) -> Result<TestResult, GamesError> {
        let score = puzzle.score().ok_or(GamesError::NotFinished)?;
        Ok(self
            .results
            .record_game(user_id, &GameKind::QuotePuzzle, score, Some(puzzle.metadata()))
            .await?)
    }

    /// # Errors
    ///
    /// Returns `GamesError::Crossword` if the built-in grid does not fit.
    pub fn crossword(&self) -> Result<Crossword, GamesError> {
        Ok(Crossword::new(LITERARY_CROSSWORD)?)
    }

    /// Save a completed crossword.
    ///
    /// # Errors
    ///
    /// Returns `GamesError::NotFinished` while any word is wrong and
    /// `GamesError::Results` if the write fails.
    pub async fn finish_crossword(
        &self,
        user_id: UserId,
        crossword: &Crossword,
    ) -> Result<TestResult, GamesError> {
        let score = crossword.score().ok_or(GamesError::NotFinished)?;
        Ok(self
            .results
            .record_game(user_id, &GameKind::Crossword, score, Some(crossword.metadata()))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use lit_core::time::fixed_now;
    use storage::repository::InMemoryRepository;
    use storage::seed::seed_catalog;

    use super::*;

    async fn service() -> GamesService {
        let repo = Arc::new(InMemoryRepository::new());
        seed_catalog(repo.as_ref()).await.unwrap();
        let clock = Clock::fixed(fixed_now());
        let results = Arc::new(ResultService::new(clock, repo.clone(), repo.clone()));
        GamesService::new(clock, repo, results)
    }

    #[tokio::test]
    async fn author_round_is_saved_once_finished() {
        let games = service().await;
        let mut rng = StdRng::seed_from_u64(11);
        let mut round = games.author_round(&mut rng).await.unwrap();
        let user = UserId::new(3);

        assert!(matches!(
            games.finish_author_round(user, &round).await,
            Err(GamesError::NotFinished)
        ));

        let mut now = fixed_now();
        while let Some(question) = round.current().cloned() {
            round.select(question.author.id(), now).unwrap();
            round.submit(now).unwrap();
            now += chrono::Duration::seconds(1);
            round.advance(now).unwrap();
        }

        let saved = games.finish_author_round(user, &round).await.unwrap();
        assert_eq!(saved.score, 100);
        assert_eq!(saved.title.as_deref(), Some("Game: Guess the Author"));
        assert_eq!(saved.metadata.unwrap()["total"], 10);
    }

    #[tokio::test]
    async fn solved_puzzle_is_saved_with_metadata() {
        let games = service().await;
        let mut rng = StdRng::seed_from_u64(5);
        let mut puzzle = games.puzzle(6, &mut rng).unwrap();
        assert!(matches!(
            games.finish_puzzle(UserId::new(1), &puzzle).await,
            Err(GamesError::NotFinished)
        ));

        while puzzle.score().is_none() {
            puzzle.hint(&mut rng);
        }
        let saved = games.finish_puzzle(UserId::new(1), &puzzle).await.unwrap();
        assert!(saved.test.is_game());
        assert_eq!(saved.metadata.unwrap()["quote_id"], 6);
        assert!(saved.score <= 90);
    }

    #[tokio::test]
    async fn completed_crossword_is_saved() {
        let games = service().await;
        let mut crossword = games.crossword().unwrap();
        let user = UserId::new(4);

        crossword.reveal(0, 0).unwrap();
        assert!(matches!(
            games.finish_crossword(user, &crossword).await,
            Err(GamesError::NotFinished)
        ));

        for clue in LITERARY_CROSSWORD {
            crossword
                .enter_word(clue.number, clue.direction, clue.answer)
                .unwrap();
        }
        let saved = games.finish_crossword(user, &crossword).await.unwrap();
        assert_eq!(saved.score, 95);
        assert_eq!(saved.title.as_deref(), Some("Game: Literary Crossword"));
        assert_eq!(saved.metadata.unwrap()["revealed_cells"], 1);
    }

    #[test]
    fn unknown_quote_is_rejected() {
        let repo = Arc::new(InMemoryRepository::new());
        let clock = Clock::fixed(fixed_now());
        let results = Arc::new(ResultService::new(clock, repo.clone(), repo.clone()));
        let games = GamesService::new(clock, repo, results);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(games.puzzle(99, &mut rng), Err(GamesError::UnknownQuote(99))));
        assert!(games.random_puzzle(&mut rng).is_ok());
    }
}
