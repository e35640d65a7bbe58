use std::sync::Arc;

use lit_core::model::{Author, Category, Quiz, QuizFilter, QuizId, WorkId, WorkWithAuthor};
use storage::repository::CatalogRepository;
use storage::seed::{SeedReport, seed_catalog};
use tracing::warn;

use crate::error::CatalogServiceError;

/// Read access to the seeded library.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// Load the built-in catalog. Safe to run repeatedly.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Seed` if any row fails to validate or persist.
    pub async fn seed(&self) -> Result<SeedReport, CatalogServiceError> {
        Ok(seed_catalog(self.catalog.as_ref()).await?)
    }

    /// Works in the library, optionally limited to one category.
    ///
    /// Storage failures degrade to an empty list.
    pub async fn list_works(&self, category: Option<Category>) -> Vec<WorkWithAuthor> {
        self.catalog
            .list_works(category)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to list works");
                Vec::new()
            })
    }

    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn get_work(&self, id: WorkId) -> Result<Option<WorkWithAuthor>, CatalogServiceError> {
        Ok(self.catalog.get_work(id).await?)
    }

    /// Quizzes matching `filter`; storage failures degrade to an empty list.
    pub async fn list_quizzes(&self, filter: QuizFilter) -> Vec<Quiz> {
        self.catalog
            .list_quizzes(&filter)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to list quizzes");
                Vec::new()
            })
    }

    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, CatalogServiceError> {
        Ok(self.catalog.get_quiz(id).await?)
    }

    pub async fn list_authors(&self) -> Vec<Author> {
        self.catalog.list_authors().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to list authors");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use lit_core::model::QuizType;
    use storage::repository::InMemoryRepository;

    use super::*;

    async fn seeded() -> CatalogService {
        let service = CatalogService::new(Arc::new(InMemoryRepository::new()));
        service.seed().await.unwrap();
        service
    }

    #[tokio::test]
    async fn library_filters_by_category() {
        let catalog = seeded().await;
        let zno = catalog.list_works(Some(Category::Zno)).await;
        assert_eq!(zno.len(), 5);
        assert!(zno.iter().all(|w| w.work.is_in(Category::Zno)));
        assert_eq!(catalog.list_works(None).await.len(), 9);
        assert_eq!(catalog.list_authors().await.len(), 8);
    }

    #[tokio::test]
    async fn quizzes_and_lookups() {
        let catalog = seeded().await;
        let quote = catalog.list_quizzes(QuizFilter::by_type(QuizType::Quote)).await;
        assert_eq!(quote.len(), 2);
        assert!(catalog.get_quiz(QuizId::new(3)).await.unwrap().is_some());
        assert!(catalog.get_work(WorkId::new(404)).await.unwrap().is_none());
    }
}
