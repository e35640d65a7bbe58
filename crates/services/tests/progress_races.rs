use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use lit_core::cache::InMemoryCache;
use lit_core::model::{ProgressId, ProgressPatch, ProgressRecord, ProgressUpdate, UserId, WorkId};
use lit_core::pagination::LayoutSettings;
use lit_core::time::fixed_now;
use services::{Clock, ProgressService, ProgressServiceError, ReaderError, ReaderSession, RetryPolicy};
use storage::repository::{InMemoryRepository, NewProgressRecord, ProgressRepository, StorageError};
use storage::seed::seed_catalog;

/// Yields after reading, so concurrent callers act on the same snapshot.
struct YieldingRepo {
    inner: InMemoryRepository,
}

#[async_trait]
impl ProgressRepository for YieldingRepo {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = ProgressRepository::list_for_user(&self.inner, user_id).await?;
        tokio::task::yield_now().await;
        Ok(rows)
    }

    async fn create(&self, record: NewProgressRecord) -> Result<ProgressRecord, StorageError> {
        ProgressRepository::create(&self.inner, record).await
    }

    async fn update(
        &self,
        id: ProgressId,
        patch: ProgressPatch,
    ) -> Result<ProgressRecord, StorageError> {
        self.inner.update(id, patch).await
    }

    async fn upsert_latest(
        &self,
        user_id: UserId,
        work_id: WorkId,
        update: ProgressUpdate,
    ) -> Result<ProgressRecord, StorageError> {
        self.inner.upsert_latest(user_id, work_id, update).await
    }
}

/// Fails the first `failures` list calls and every write.
struct FlakyRepo {
    inner: InMemoryRepository,
    failures: u32,
    calls: AtomicU32,
}

#[async_trait]
impl ProgressRepository for FlakyRepo {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(StorageError::Connection("connection reset".into()));
        }
        ProgressRepository::list_for_user(&self.inner, user_id).await
    }

    async fn create(&self, _record: NewProgressRecord) -> Result<ProgressRecord, StorageError> {
        Err(StorageError::Connection("read-only".into()))
    }

    async fn update(
        &self,
        _id: ProgressId,
        _patch: ProgressPatch,
    ) -> Result<ProgressRecord, StorageError> {
        Err(StorageError::Connection("read-only".into()))
    }

    async fn upsert_latest(
        &self,
        _user_id: UserId,
        _work_id: WorkId,
        _update: ProgressUpdate,
    ) -> Result<ProgressRecord, StorageError> {
        Err(StorageError::Connection("read-only".into()))
    }
}

async fn seeded_repo() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    seed_catalog(&repo).await.expect("seed");
    repo
}

fn service(repo: &InMemoryRepository, progress: Arc<dyn ProgressRepository>) -> ProgressService {
    ProgressService::new(
        Clock::fixed(fixed_now()),
        progress,
        Arc::new(repo.clone()),
        Arc::new(InMemoryCache::new()),
        RetryPolicy::immediate(2),
    )
}

#[tokio::test]
async fn legacy_read_then_write_can_duplicate_rows() {
    let repo = seeded_repo().await;
    let service = service(&repo, Arc::new(YieldingRepo { inner: repo.clone() }));
    let (user, work) = (UserId::new(1), WorkId::new(1));

    let (a, b) = tokio::join!(
        service.record_page_legacy(user, work, 2, 8),
        service.record_page_legacy(user, work, 3, 8),
    );
    a.expect("first write");
    b.expect("second write");

    let rows = service.list_progress(user).await;
    assert_eq!(rows.len(), 2, "both callers missed and inserted");
    let view = service.progress_for(user, work).await;
    assert!(view.is_started());
}

#[tokio::test]
async fn conditional_upsert_keeps_one_row_under_the_same_interleaving() {
    let repo = seeded_repo().await;
    let service = service(&repo, Arc::new(YieldingRepo { inner: repo.clone() }));
    let (user, work) = (UserId::new(1), WorkId::new(1));

    let (a, b) = tokio::join!(
        service.record_page(user, work, 2, 8),
        service.record_page(user, work, 3, 8),
    );
    a.expect("first write");
    b.expect("second write");

    assert_eq!(service.list_progress(user).await.len(), 1);
}

#[tokio::test]
async fn list_read_is_retried_before_succeeding() {
    let repo = seeded_repo().await;
    ProgressRepository::create(
        &repo,
        NewProgressRecord {
            user_id: UserId::new(2),
            work_id: WorkId::new(2),
            update: ProgressUpdate::at_page(1, 6, fixed_now()),
        },
    )
    .await
    .expect("row");
    let flaky = Arc::new(FlakyRepo {
        inner: repo.clone(),
        failures: 2,
        calls: AtomicU32::new(0),
    });
    let service = service(&repo, flaky.clone());

    assert_eq!(service.list_progress(UserId::new(2)).await.len(), 1);
    assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn list_read_degrades_to_empty_after_retries() {
    let repo = seeded_repo().await;
    let flaky = Arc::new(FlakyRepo {
        inner: repo.clone(),
        failures: u32::MAX,
        calls: AtomicU32::new(0),
    });
    let service = service(&repo, flaky.clone());

    assert!(service.list_progress(UserId::new(2)).await.is_empty());
    assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    assert_eq!(service.reading_stats(UserId::new(2)).await.read, 0);
}

#[tokio::test]
async fn failed_page_write_reaches_the_reader() {
    let repo = seeded_repo().await;
    let flaky = Arc::new(FlakyRepo {
        inner: repo.clone(),
        failures: 0,
        calls: AtomicU32::new(0),
    });
    let progress = Arc::new(service(&repo, flaky));

    let layout = LayoutSettings::new(18.0, 1.6, 400.0, 1000.0).expect("layout");
    let mut session = ReaderSession::open(
        &repo,
        Arc::clone(&progress),
        UserId::new(1),
        WorkId::new(1),
        layout,
        Box::new(|_: &str, _: &LayoutSettings| 180.0),
    )
    .await
    .expect("open");

    let err = session.next_page().await.expect_err("write fails");
    assert!(matches!(
        err,
        ReaderError::Progress(ProgressServiceError::Storage(StorageError::Connection(_)))
    ));
    assert_eq!(session.current_page(), 2);
    assert_eq!(progress.cache().page(WorkId::new(1)), Some(2));
}
