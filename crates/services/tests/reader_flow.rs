use lit_core::model::{UserId, WorkId};
use lit_core::pagination::{LayoutSettings, PLACEHOLDER_TEXT};
use lit_core::reconcile::ProgressSource;
use lit_core::time::fixed_now;
use services::{AppServices, BoxedMeasure, Clock, ReaderError};

async fn app() -> AppServices {
    let app = AppServices::in_memory(Clock::fixed(fixed_now()));
    app.catalog().seed().await.expect("seed");
    app
}

fn layout(font_size: f32) -> LayoutSettings {
    LayoutSettings::new(font_size, 1.6, 400.0, 1000.0).expect("layout")
}

/// Every paragraph is ten times the font size tall.
fn font_scaled() -> BoxedMeasure {
    Box::new(|_: &str, layout: &LayoutSettings| layout.font_size() * 10.0)
}

#[tokio::test]
async fn reading_resumes_where_the_user_stopped() {
    let app = app().await;
    let (user, work) = (UserId::new(1), WorkId::new(1));

    let mut session = app
        .reader()
        .open(user, work, layout(18.0), font_scaled())
        .await
        .expect("open");
    // 8 paragraphs at 180px, three to a page.
    assert_eq!(session.total_pages(), 3);
    assert_eq!(session.current_page(), 1);
    assert_eq!(session.resumed_from(), ProgressSource::NotStarted);
    assert_eq!(session.current_paragraphs().len(), 3);

    assert_eq!(session.next_page().await.expect("next"), 2);
    drop(session);

    let mut session = app
        .reader()
        .open(user, work, layout(18.0), font_scaled())
        .await
        .expect("reopen");
    assert_eq!(session.current_page(), 2);
    assert_eq!(session.resumed_from(), ProgressSource::Persisted);

    assert_eq!(session.go_to(3).await.expect("last page"), 3);
    assert!(session.is_last_page());
    assert_eq!(session.current_paragraphs().len(), 2);
    assert_eq!(session.next_page().await.expect("stays"), 3);

    let view = app.progress().progress_for(user, work).await;
    assert!(view.completed);
    assert_eq!(view.percentage, 100);
    assert_eq!(app.progress().list_progress(user).await.len(), 1);
}

#[tokio::test]
async fn previous_page_stops_at_the_first_page() {
    let app = app().await;
    let mut session = app
        .reader()
        .open(UserId::new(2), WorkId::new(2), layout(18.0), font_scaled())
        .await
        .expect("open");
    assert_eq!(session.previous_page().await.expect("prev"), 1);
    assert!(app.progress().list_progress(UserId::new(2)).await.is_empty());
}

#[tokio::test]
async fn persisted_total_above_the_estimate_wins() {
    let app = app().await;
    let (user, work) = (UserId::new(3), WorkId::new(1));
    app.progress()
        .record_page(user, work, 9, 12)
        .await
        .expect("seed progress");

    let session = app
        .reader()
        .open(user, work, layout(18.0), font_scaled())
        .await
        .expect("open");
    assert_eq!(session.total_pages(), 12);
    assert_eq!(session.current_page(), 9);
    assert!(session.current_paragraphs().is_empty());
}

#[tokio::test]
async fn cached_page_past_the_end_restarts_at_one() {
    let app = app().await;
    let (user, work) = (UserId::new(4), WorkId::new(3));
    app.progress().cache().set_page(work, 50).expect("cache");

    let session = app
        .reader()
        .open(user, work, layout(18.0), font_scaled())
        .await
        .expect("open");
    assert_eq!(session.resumed_from(), ProgressSource::LocalCache);
    assert_eq!(session.current_page(), 1);
}

#[tokio::test]
async fn cached_page_is_measured_against_the_layout_total() {
    let app = app().await;
    let (user, work) = (UserId::new(7), WorkId::new(1));
    app.progress().cache().set_page(work, 2).expect("cache");

    let session = app
        .reader()
        .open(user, work, layout(18.0), font_scaled())
        .await
        .expect("open");
    let resumed = session.resumed();
    assert_eq!(resumed.source, ProgressSource::LocalCache);
    assert!(resumed.record.is_none());
    assert_eq!(resumed.total_pages, session.total_pages());
    assert_eq!(resumed.total_pages, 3);
    assert_eq!(resumed.percentage, 67);
    assert!(!resumed.completed);
    assert!(!session.is_placeholder());
}

#[tokio::test]
async fn relayout_never_shrinks_the_book() {
    let app = app().await;
    let mut session = app
        .reader()
        .open(UserId::new(5), WorkId::new(1), layout(18.0), font_scaled())
        .await
        .expect("open");
    assert_eq!(session.total_pages(), 3);
    session.go_to(3).await.expect("go to 3");

    // 400px paragraphs fit two to a page.
    assert_eq!(session.relayout(layout(40.0)), 4);
    assert_eq!(session.layout_runs(), 2);

    assert_eq!(session.relayout(layout(18.0)), 4);
    assert_eq!(session.current_page(), 3);
    assert_eq!(session.relayout(layout(18.0)), 4);
    assert_eq!(session.layout_runs(), 3);

    let prefs = app.progress().cache().prefs().expect("prefs cached");
    assert!((prefs.font_size - 18.0).abs() < f32::EPSILON);
}

#[tokio::test]
async fn works_without_text_show_a_placeholder_page() {
    let app = app().await;
    let mut session = app
        .reader()
        .open(UserId::new(6), WorkId::new(7), layout(18.0), font_scaled())
        .await
        .expect("open");
    assert_eq!(session.total_pages(), 1);
    assert_eq!(session.current_paragraphs(), [PLACEHOLDER_TEXT.to_owned()]);
    assert!(session.is_placeholder());

    let err = session.go_to(2).await.expect_err("past the end");
    assert!(matches!(err, ReaderError::Progress(_)));
}

#[tokio::test]
async fn unknown_work_is_reported() {
    let app = app().await;
    let err = app
        .reader()
        .open(UserId::new(1), WorkId::new(404), layout(18.0), font_scaled())
        .await
        .err()
        .expect("missing work");
    assert!(matches!(err, ReaderError::WorkNotFound(id) if id == WorkId::new(404)));
}
