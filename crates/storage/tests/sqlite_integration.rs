use chrono::Duration;
use lit_core::model::{
    Category, GameKind, NewTestResult, ProgressPatch, ProgressUpdate, QuizFilter, QuizId,
    QuizType, TestRef, UserId, WorkId,
};
use lit_core::time::fixed_now;
use serde_json::json;
use storage::repository::{
    CatalogRepository, NewProgressRecord, ProgressRepository, ResultRepository, StorageError,
};
use storage::seed::seed_catalog;
use storage::sqlite::SqliteRepository;

async fn seeded(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    seed_catalog(&repo).await.expect("seed");
    repo
}

#[tokio::test]
async fn sqlite_catalog_round_trips_seeded_works() {
    let repo = seeded("memdb_catalog").await;

    let works = repo.list_works(None).await.unwrap();
    assert_eq!(works.len(), 9);
    let modern = repo.list_works(Some(Category::Modern)).await.unwrap();
    assert!(modern.iter().all(|w| w.work.is_in(Category::Modern)));
    assert_eq!(modern.len(), 4);

    let kaidash = repo.get_work(WorkId::new(1)).await.unwrap().unwrap();
    assert_eq!(kaidash.author.name(), "Іван Нечуй-Левицький");
    assert_eq!(kaidash.work.quotes().len(), 3);
    assert_eq!(kaidash.work.year(), Some(1878));
    assert!(!kaidash.work.full_text().is_empty());
    assert!(repo.get_work(WorkId::new(404)).await.unwrap().is_none());

    let quote_quizzes = repo
        .list_quizzes(&QuizFilter::by_type(QuizType::Quote))
        .await
        .unwrap();
    assert_eq!(quote_quizzes.len(), 2);
    let by_work = repo
        .list_quizzes(&QuizFilter::by_work(WorkId::new(4)))
        .await
        .unwrap();
    assert_eq!(by_work.len(), 2);
    let quiz = repo.get_quiz(QuizId::new(3)).await.unwrap().unwrap();
    assert_eq!((quiz.question_count, quiz.time_minutes), (15, Some(25)));
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = seeded("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    seed_catalog(&repo).await.expect("reseed");
    assert_eq!(repo.list_authors().await.unwrap().len(), 8);
}

#[tokio::test]
async fn sqlite_upsert_latest_targets_newest_row() {
    let repo = seeded("memdb_upsert_latest").await;
    let (user, work) = (UserId::new(1), WorkId::new(2));
    let now = fixed_now();

    let older = ProgressRepository::create(
        &repo,
        NewProgressRecord {
            user_id: user,
            work_id: work,
            update: ProgressUpdate::at_page(2, 6, now - Duration::hours(3)),
        },
    )
    .await
    .unwrap();
    let newer = ProgressRepository::create(
        &repo,
        NewProgressRecord {
            user_id: user,
            work_id: work,
            update: ProgressUpdate::at_page(3, 6, now - Duration::hours(1)),
        },
    )
    .await
    .unwrap();

    let row = repo
        .upsert_latest(user, work, ProgressUpdate::at_page(6, 6, now))
        .await
        .unwrap();
    assert_eq!(row.id, newer.id);
    assert!(row.completed);
    assert_eq!(row.percentage, 100);
    assert_eq!(row.last_read_at, Some(now));

    let rows = ProgressRepository::list_for_user(&repo, user).await.unwrap();
    assert_eq!(rows.len(), 2);
    let untouched = rows.iter().find(|r| r.id == older.id).unwrap();
    assert_eq!(untouched.current_page, 2);

    let inserted = repo
        .upsert_latest(user, WorkId::new(3), ProgressUpdate::at_page(1, 7, now))
        .await
        .unwrap();
    assert_eq!(inserted.work_id, WorkId::new(3));
    assert_eq!(ProgressRepository::list_for_user(&repo, user).await.unwrap().len(), 3);
}

#[tokio::test]
async fn sqlite_repeated_upserts_keep_one_row() {
    let repo = seeded("memdb_upsert_repeated").await;
    let (user, work) = (UserId::new(9), WorkId::new(1));

    for page in 1..=8_u32 {
        let at = fixed_now() + Duration::seconds(i64::from(page));
        repo.upsert_latest(user, work, ProgressUpdate::at_page(page, 8, at))
            .await
            .unwrap();
    }

    let rows = ProgressRepository::list_for_user(&repo, user).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].current_page, 8);
    assert!(rows[0].completed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sqlite_file_concurrent_upserts_keep_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("lit.sqlite3").display());
    let repo = SqliteRepository::connect(&url).await.unwrap();
    repo.migrate().await.unwrap();
    seed_catalog(&repo).await.unwrap();
    let (user, work) = (UserId::new(12), WorkId::new(2));
    let (a, b) = (repo.clone(), repo.clone());

    let (first, second) = tokio::join!(
        tokio::spawn(async move {
            a.upsert_latest(user, work, ProgressUpdate::at_page(2, 8, fixed_now()))
                .await
        }),
        tokio::spawn(async move {
            b.upsert_latest(user, work, ProgressUpdate::at_page(3, 8, fixed_now()))
                .await
        }),
    );
    let first = first.unwrap().unwrap();
    let second = second.unwrap().unwrap();
    assert_eq!(first.id, second.id);

    let rows = ProgressRepository::list_for_user(&repo, user).await.unwrap();
    let for_work: Vec<_> = rows.iter().filter(|r| r.work_id == work).collect();
    assert_eq!(for_work.len(), 1);
    assert!([2, 3].contains(&for_work[0].current_page));
}

#[tokio::test]
async fn sqlite_patch_leaves_absent_fields() {
    let repo = seeded("memdb_patch").await;
    let created = ProgressRepository::create(
        &repo,
        NewProgressRecord {
            user_id: UserId::new(1),
            work_id: WorkId::new(1),
            update: ProgressUpdate::at_page(1, 8, fixed_now()),
        },
    )
    .await
    .unwrap();

    let patched = repo
        .update(
            created.id,
            ProgressPatch {
                current_page: Some(4),
                percentage: Some(50),
                ..ProgressPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!((patched.current_page, patched.total_pages), (4, 8));
    assert_eq!(patched.percentage, 50);
    assert_eq!(patched.last_read_at, Some(fixed_now()));

    let missing = repo
        .update(lit_core::model::ProgressId::new(999), ProgressPatch::default())
        .await;
    assert!(matches!(missing, Err(StorageError::NotFound)));
}

#[tokio::test]
async fn sqlite_results_keep_game_sentinel_and_metadata() {
    let repo = seeded("memdb_results").await;
    let user = UserId::new(5);
    let meta = json!({ "quote_id": 3, "attempts": 4, "hints_used": 1 });

    let game = ResultRepository::create(
        &repo,
        NewTestResult::game(user, &GameKind::QuotePuzzle, 70, Some(meta.clone()), fixed_now()),
    )
    .await
    .unwrap();
    let quiz = ResultRepository::create(
        &repo,
        NewTestResult {
            user_id: user,
            test: TestRef::Quiz(QuizId::new(2)),
            score: 9,
            completed: true,
            completed_at: None,
            metadata: None,
            title: None,
            max_score: None,
        },
    )
    .await
    .unwrap();

    let rows = ResultRepository::list_for_user(&repo, user).await.unwrap();
    assert_eq!(rows, vec![game, quiz]);
    assert!(rows[0].test.is_game());
    assert_eq!(rows[0].metadata, Some(meta));
    assert_eq!(rows[0].title.as_deref(), Some("Game: Quote Puzzle"));
    assert_eq!(rows[1].test, TestRef::Quiz(QuizId::new(2)));
}
