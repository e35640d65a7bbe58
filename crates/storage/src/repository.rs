use async_trait::async_trait;
use lit_core::model::{
    Author, AuthorId, Category, NewTestResult, ProgressId, ProgressPatch, ProgressRecord,
    ProgressUpdate, Quiz, QuizFilter, QuizId, ResultId, TestResult, UserId, Work, WorkId,
    WorkWithAuthor,
};
use lit_core::reconcile::recency_key;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A progress row before the store assigns it an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewProgressRecord {
    pub user_id: UserId,
    pub work_id: WorkId,
    pub update: ProgressUpdate,
}

impl NewProgressRecord {
    #[must_use]
    pub fn assign_id(self, id: ProgressId) -> ProgressRecord {
        ProgressRecord {
            id,
            user_id: self.user_id,
            work_id: self.work_id,
            percentage: self.update.percentage,
            current_page: self.update.current_page,
            total_pages: self.update.total_pages,
            last_read_at: Some(self.update.last_read_at),
            completed: self.update.completed,
        }
    }
}

/// Read side of the seeded catalog, plus the writes seeding needs.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Persist or replace an author.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the author cannot be stored.
    async fn upsert_author(&self, author: &Author) -> Result<(), StorageError>;

    /// Persist or replace a work. Its author must exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the author is missing, or other
    /// storage errors.
    async fn upsert_work(&self, work: &Work) -> Result<(), StorageError>;

    /// Persist or replace a quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_authors(&self) -> Result<Vec<Author>, StorageError>;

    /// Works joined with their authors, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_works(&self, category: Option<Category>)
    -> Result<Vec<WorkWithAuthor>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn get_work(&self, id: WorkId) -> Result<Option<WorkWithAuthor>, StorageError>;

    /// Quizzes matching the filter, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_quizzes(&self, filter: &QuizFilter) -> Result<Vec<Quiz>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Every row for the user, historical duplicates included.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn create(&self, record: NewProgressRecord) -> Result<ProgressRecord, StorageError>;

    /// Patch a row by id and return it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the row is missing.
    async fn update(
        &self,
        id: ProgressId,
        patch: ProgressPatch,
    ) -> Result<ProgressRecord, StorageError>;

    /// Update the most recent row for (user, work), or insert one if none
    /// exists, as a single atomic step.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn upsert_latest(
        &self,
        user_id: UserId,
        work_id: WorkId,
        update: ProgressUpdate,
    ) -> Result<ProgressRecord, StorageError>;
}

#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<TestResult>, StorageError>;

    /// Store a new row (one per play) and return it with its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn create(&self, result: NewTestResult) -> Result<TestResult, StorageError>;
}

#[derive(Default)]
struct ProgressTable {
    next_id: u64,
    rows: Vec<ProgressRecord>,
}

#[derive(Default)]
struct ResultTable {
    next_id: u64,
    rows: Vec<TestResult>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    authors: Arc<Mutex<HashMap<AuthorId, Author>>>,
    works: Arc<Mutex<HashMap<WorkId, Work>>>,
    quizzes: Arc<Mutex<HashMap<QuizId, Quiz>>>,
    progress: Arc<Mutex<ProgressTable>>,
    results: Arc<Mutex<ResultTable>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn join(&self, work: &Work) -> Result<WorkWithAuthor, StorageError> {
        let authors = self
            .authors
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let author = authors
            .get(&work.author_id())
            .cloned()
            .ok_or(StorageError::NotFound)?;
        Ok(WorkWithAuthor {
            work: work.clone(),
            author,
        })
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn upsert_author(&self, author: &Author) -> Result<(), StorageError> {
        let mut guard = self
            .authors
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(author.id(), author.clone());
        Ok(())
    }

    async fn upsert_work(&self, work: &Work) -> Result<(), StorageError> {
        {
            let authors = self
                .authors
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            if !authors.contains_key(&work.author_id()) {
                return Err(StorageError::NotFound);
            }
        }
        let mut guard = self
            .works
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(work.id(), work.clone());
        Ok(())
    }

    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(quiz.id, quiz.clone());
        Ok(())
    }

    async fn list_authors(&self) -> Result<Vec<Author>, StorageError> {
        let guard = self
            .authors
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut authors: Vec<Author> = guard.values().cloned().collect();
        authors.sort_by_key(Author::id);
        Ok(authors)
    }

    async fn list_works(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<WorkWithAuthor>, StorageError> {
        let mut works: Vec<Work> = {
            let guard = self
                .works
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard
                .values()
                .filter(|w| category.is_none_or(|c| w.is_in(c)))
                .cloned()
                .collect()
        };
        works.sort_by_key(Work::id);
        works.iter().map(|w| self.join(w)).collect()
    }

    async fn get_work(&self, id: WorkId) -> Result<Option<WorkWithAuthor>, StorageError> {
        let work = {
            let guard = self
                .works
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.get(&id).cloned()
        };
        work.map(|w| self.join(&w)).transpose()
    }

    async fn list_quizzes(&self, filter: &QuizFilter) -> Result<Vec<Quiz>, StorageError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut quizzes: Vec<Quiz> = guard.values().filter(|q| filter.matches(q)).cloned().collect();
        quizzes.sort_by_key(|q| q.id);
        Ok(quizzes)
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, record: NewProgressRecord) -> Result<ProgressRecord, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_id += 1;
        let row = record.assign_id(ProgressId::new(guard.next_id));
        guard.rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: ProgressId,
        patch: ProgressPatch,
    ) -> Result<ProgressRecord, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let row = guard
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StorageError::NotFound)?;
        row.apply(patch);
        Ok(row.clone())
    }

    async fn upsert_latest(
        &self,
        user_id: UserId,
        work_id: WorkId,
        update: ProgressUpdate,
    ) -> Result<ProgressRecord, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        // Same order as `latest_for_work` and the SQLite query.
        let latest = guard
            .rows
            .iter_mut()
            .filter(|r| r.user_id == user_id && r.work_id == work_id)
            .max_by_key(|r| recency_key(r));
        if let Some(row) = latest {
            row.apply(update.into());
            return Ok(row.clone());
        }

        guard.next_id += 1;
        let row = NewProgressRecord {
            user_id,
            work_id,
            update,
        }
        .assign_id(ProgressId::new(guard.next_id));
        guard.rows.push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<TestResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, result: NewTestResult) -> Result<TestResult, StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_id += 1;
        let row = result.assign_id(ResultId::new(guard.next_id));
        guard.rows.push(row.clone());
        Ok(row)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn CatalogRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub results: Arc<dyn ResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let results: Arc<dyn ResultRepository> = Arc::new(repo);
        Self {
            catalog,
            progress,
            results,
        }
    }
}
