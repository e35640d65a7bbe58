use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;

use crate::model::{Author, AuthorId, WorkId, WorkWithAuthor};
use crate::scoring::{AUTHOR_QUIZ_QUESTIONS, ScoreTier, author_quiz_percentage};

/// Wrong options offered next to the true author.
pub const DISTRACTORS: usize = 3;

/// Seconds a player has to answer one question.
pub const ANSWER_WINDOW_SECS: i64 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthorQuizError {
    #[error("no quotes available for the game")]
    NoQuestions,

    #[error("author {0} is not an option for this question")]
    NotAnOption(AuthorId),

    #[error("question already answered")]
    AlreadyAnswered,

    #[error("question not answered yet")]
    NotAnswered,

    #[error("answer window has closed")]
    Expired,

    #[error("game is over")]
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorQuestion {
    pub quote: String,
    pub work_id: WorkId,
    pub author: Author,
    /// True author plus distractors, shuffled.
    pub options: Vec<Author>,
}

/// One question per quote of every work that has quotes.
pub fn build_questions<R: Rng + ?Sized>(
    works: &[WorkWithAuthor],
    rng: &mut R,
) -> Vec<AuthorQuestion> {
    let mut seen = HashSet::new();
    let authors: Vec<&Author> = works
        .iter()
        .map(|w| &w.author)
        .filter(|a| seen.insert(a.id()))
        .collect();

    let mut questions = Vec::new();
    for entry in works.iter().filter(|w| !w.work.quotes().is_empty()) {
        for quote in entry.work.quotes() {
            let mut others: Vec<&Author> = authors
                .iter()
                .copied()
                .filter(|a| a.id() != entry.author.id())
                .collect();
            others.shuffle(rng);

            let mut options: Vec<Author> = std::iter::once(&entry.author)
                .chain(others.into_iter().take(DISTRACTORS))
                .cloned()
                .collect();
            options.shuffle(rng);

            questions.push(AuthorQuestion {
                quote: quote.clone(),
                work_id: entry.work.id(),
                author: entry.author.clone(),
                options,
            });
        }
    }
    questions
}

/// A shuffled round of at most `AUTHOR_QUIZ_QUESTIONS` questions.
pub fn sample_round<R: Rng + ?Sized>(
    works: &[WorkWithAuthor],
    rng: &mut R,
) -> Vec<AuthorQuestion> {
    let mut questions = build_questions(works, rng);
    questions.shuffle(rng);
    questions.truncate(AUTHOR_QUIZ_QUESTIONS);
    questions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub chosen: Option<AuthorId>,
    pub correct_author: AuthorId,
    pub correct: bool,
    pub timed_out: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
    pub tier: ScoreTier,
}

impl RoundSummary {
    #[must_use]
    pub fn feedback(&self) -> &'static str {
        self.tier.feedback()
    }
}

/// State of one author-guessing round.
#[derive(Debug, Clone)]
pub struct AuthorQuiz {
    questions: Vec<AuthorQuestion>,
    index: usize,
    selected: Option<AuthorId>,
    outcome: Option<AnswerOutcome>,
    deadline: DateTime<Utc>,
    correct: u32,
    finished: bool,
}

impl AuthorQuiz {
    /// Start a round; the first answer window opens at `now`.
    ///
    /// # Errors
    ///
    /// Returns `AuthorQuizError::NoQuestions` for an empty round.
    pub fn start(questions: Vec<AuthorQuestion>, now: DateTime<Utc>) -> Result<Self, AuthorQuizError> {
        if questions.is_empty() {
            return Err(AuthorQuizError::NoQuestions);
        }
        Ok(Self {
            questions,
            index: 0,
            selected: None,
            outcome: None,
            deadline: now + Duration::seconds(ANSWER_WINDOW_SECS),
            correct: 0,
            finished: false,
        })
    }

    #[must_use]
    pub fn current(&self) -> Option<&AuthorQuestion> {
        if self.finished {
            None
        } else {
            self.questions.get(self.index)
        }
    }

    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.index + 1, self.questions.len())
    }

    #[must_use]
    pub fn selected(&self) -> Option<AuthorId> {
        self.selected
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whole seconds left to answer, zero once the window closed.
    #[must_use]
    pub fn seconds_left(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_seconds().max(0)
    }

    /// Choose an option at `now`. Only choices made inside the answer window
    /// count; a late choice leaves the earlier selection in place.
    ///
    /// # Errors
    ///
    /// Fails when the question is answered, the game is over, the window has
    /// closed, or the author is not among the options.
    pub fn select(&mut self, author_id: AuthorId, now: DateTime<Utc>) -> Result<(), AuthorQuizError> {
        let question = self.open_question()?;
        if now >= self.deadline {
            return Err(AuthorQuizError::Expired);
        }
        if !question.options.iter().any(|a| a.id() == author_id) {
            return Err(AuthorQuizError::NotAnOption(author_id));
        }
        self.selected = Some(author_id);
        Ok(())
    }

    /// Lock in the current selection. After the deadline this behaves like
    /// an expiry: only a selection made before the deadline is credited.
    ///
    /// # Errors
    ///
    /// Fails when the question is already answered or the game is over.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<AnswerOutcome, AuthorQuizError> {
        self.open_question()?;
        Ok(self.answer(now >= self.deadline))
    }

    /// Submit whatever is selected if the answer window has closed.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> Option<AnswerOutcome> {
        if now < self.deadline || self.open_question().is_err() {
            return None;
        }
        Some(self.answer(true))
    }

    /// Move to the next question, or finish after the last one.
    ///
    /// # Errors
    ///
    /// Returns `AuthorQuizError::NotAnswered` if the current question is open.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Option<&AuthorQuestion>, AuthorQuizError> {
        if self.finished {
            return Err(AuthorQuizError::Finished);
        }
        if self.outcome.is_none() {
            return Err(AuthorQuizError::NotAnswered);
        }
        if self.index + 1 >= self.questions.len() {
            self.finished = true;
            return Ok(None);
        }
        self.index += 1;
        self.selected = None;
        self.outcome = None;
        self.deadline = now + Duration::seconds(ANSWER_WINDOW_SECS);
        Ok(self.questions.get(self.index))
    }

    #[must_use]
    pub fn summary(&self) -> RoundSummary {
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        let correct = self.correct.min(total);
        RoundSummary {
            correct,
            total,
            percentage: author_quiz_percentage(correct, total).unwrap_or_default(),
            tier: ScoreTier::for_answers(correct, total),
        }
    }

    fn open_question(&self) -> Result<&AuthorQuestion, AuthorQuizError> {
        if self.outcome.is_some() {
            return Err(AuthorQuizError::AlreadyAnswered);
        }
        self.current().ok_or(AuthorQuizError::Finished)
    }

    fn answer(&mut self, timed_out: bool) -> AnswerOutcome {
        let correct_author = self.questions[self.index].author.id();
        let correct = self.selected == Some(correct_author);
        if correct {
            self.correct += 1;
        }
        let outcome = AnswerOutcome {
            chosen: self.selected,
            correct_author,
            correct,
            timed_out,
        };
        self.outcome = Some(outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::model::WorkDraft;
    use crate::time::fixed_now;

    fn entry(work: u64, author: u64, quotes: &[&str]) -> WorkWithAuthor {
        let mut draft = WorkDraft::new(format!("Work {work}"), AuthorId::new(author));
        draft.quotes = quotes.iter().map(|q| (*q).to_string()).collect();
        WorkWithAuthor {
            work: draft.validate(WorkId::new(work)).unwrap(),
            author: Author::new(AuthorId::new(author), format!("Author {author}")).unwrap(),
        }
    }

    fn library() -> Vec<WorkWithAuthor> {
        vec![
            entry(1, 1, &["q1", "q2", "q3"]),
            entry(2, 2, &["q4", "q5"]),
            entry(3, 3, &["q6", "q7", "q8"]),
            entry(4, 4, &["q9", "q10", "q11"]),
            entry(5, 5, &[]),
            entry(6, 1, &["q12"]),
        ]
    }

    #[test]
    fn every_quote_becomes_a_question_with_distinct_options() {
        let mut rng = StdRng::seed_from_u64(7);
        let questions = build_questions(&library(), &mut rng);
        assert_eq!(questions.len(), 12);
        for q in &questions {
            assert_eq!(q.options.len(), 1 + DISTRACTORS);
            assert!(q.options.iter().any(|a| a.id() == q.author.id()));
            let ids: HashSet<AuthorId> = q.options.iter().map(Author::id).collect();
            assert_eq!(ids.len(), q.options.len());
        }
    }

    #[test]
    fn options_shrink_when_few_authors_exist() {
        let mut rng = StdRng::seed_from_u64(1);
        let works = vec![entry(1, 1, &["a"]), entry(2, 2, &[])];
        let questions = build_questions(&works, &mut rng);
        assert_eq!(questions[0].options.len(), 2);
    }

    #[test]
    fn round_is_capped_at_ten() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(sample_round(&library(), &mut rng).len(), AUTHOR_QUIZ_QUESTIONS);
        assert!(sample_round(&[entry(5, 5, &[])], &mut rng).is_empty());
    }

    fn play(choose_right: &[bool]) -> RoundSummary {
        let mut rng = StdRng::seed_from_u64(11);
        let questions = sample_round(&library(), &mut rng);
        let now = fixed_now();
        let mut game = AuthorQuiz::start(questions, now).unwrap();
        for right in choose_right {
            let q = game.current().unwrap().clone();
            let pick = if *right {
                q.author.id()
            } else {
                q.options.iter().find(|a| a.id() != q.author.id()).unwrap().id()
            };
            game.select(pick, now).unwrap();
            game.submit(now).unwrap();
            game.advance(now).unwrap();
        }
        assert!(game.is_finished());
        game.summary()
    }

    #[test]
    fn scores_whole_rounds() {
        let all = play(&[true; 10]);
        assert_eq!((all.correct, all.percentage, all.tier), (10, 100, ScoreTier::Excellent));

        let none = play(&[false; 10]);
        assert_eq!((none.correct, none.percentage), (0, 0));

        let seven = play(&[true, true, false, true, true, false, true, true, false, true]);
        assert_eq!((seven.percentage, seven.tier), (70, ScoreTier::VeryGood));
    }

    #[test]
    fn expiry_submits_the_selection() {
        let now = fixed_now();
        let mut rng = StdRng::seed_from_u64(5);
        let questions = sample_round(&library(), &mut rng);
        let mut game = AuthorQuiz::start(questions, now).unwrap();
        let right = game.current().unwrap().author.id();
        game.select(right, now).unwrap();

        assert_eq!(game.expire_if_due(now + Duration::seconds(29)), None);
        assert_eq!(game.seconds_left(now + Duration::seconds(29)), 1);

        let outcome = game.expire_if_due(now + Duration::seconds(30)).unwrap();
        assert!(outcome.correct && outcome.timed_out);
        assert_eq!(game.select(right, now), Err(AuthorQuizError::AlreadyAnswered));

        game.advance(now + Duration::seconds(31)).unwrap();
        let later = now + Duration::seconds(70);
        let outcome = game.expire_if_due(later).unwrap();
        assert_eq!(outcome.chosen, None);
        assert!(!outcome.correct);
        assert_eq!(game.summary().correct, 1);
    }

    #[test]
    fn late_selection_is_not_credited() {
        let now = fixed_now();
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = AuthorQuiz::start(sample_round(&library(), &mut rng), now).unwrap();
        let question = game.current().unwrap().clone();
        let late = now + Duration::seconds(300);

        assert_eq!(game.select(question.author.id(), late), Err(AuthorQuizError::Expired));
        let outcome = game.submit(late).unwrap();
        assert_eq!(outcome.chosen, None);
        assert!(outcome.timed_out && !outcome.correct);

        game.advance(late).unwrap();
        let second = game.current().unwrap().clone();
        let right = second.author.id();
        let wrong = second.options.iter().find(|a| a.id() != right).unwrap().id();
        game.select(wrong, late + Duration::seconds(1)).unwrap();
        game.select(right, late + Duration::seconds(29)).unwrap();
        let after = late + Duration::seconds(30);
        assert_eq!(game.select(wrong, after), Err(AuthorQuizError::Expired));
        let outcome = game.submit(after).unwrap();
        assert_eq!(outcome.chosen, Some(right));
        assert!(outcome.correct && outcome.timed_out);
        assert_eq!(game.summary().correct, 1);
    }

    #[test]
    fn rejects_foreign_options_and_early_advance() {
        let now = fixed_now();
        let mut game = AuthorQuiz::start(build_questions(&library()[..2], &mut StdRng::seed_from_u64(2)), now).unwrap();
        assert_eq!(game.select(AuthorId::new(99), now), Err(AuthorQuizError::NotAnOption(AuthorId::new(99))));
        assert_eq!(game.advance(now).unwrap_err(), AuthorQuizError::NotAnswered);
        assert_eq!(AuthorQuiz::start(Vec::new(), now).unwrap_err(), AuthorQuizError::NoQuestions);
    }
}
