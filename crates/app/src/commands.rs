use lit_core::cache::ReaderPrefs;
use lit_core::model::{Category, QuizFilter, UserId, WorkId};
use lit_core::pagination::{LayoutSettings, LineMetrics};
use services::{AppServices, RECENTLY_READ_LIMIT};
use tracing::warn;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub async fn seed(app: &AppServices) -> CmdResult {
    let report = app.catalog().seed().await?;
    println!(
        "seeded {} authors, {} works, {} quizzes",
        report.authors, report.works, report.quizzes
    );
    Ok(())
}

pub async fn library(app: &AppServices, category: Option<Category>) -> CmdResult {
    let works = app.catalog().list_works(category).await;
    if works.is_empty() {
        println!("library is empty (run `lit seed` first)");
    }
    for entry in works {
        let work = &entry.work;
        let category = work.category().map_or("-", Category::as_str);
        let year = work.year().map_or_else(|| "-".to_owned(), |y| y.to_string());
        println!(
            "{:>3}  {:<8} {:>5}  {} - {}",
            work.id().value(),
            category,
            year,
            work.title(),
            entry.author.name()
        );
    }
    Ok(())
}

pub async fn work(app: &AppServices, id: u64) -> CmdResult {
    let work_id = WorkId::new(id);
    let Some(entry) = app.catalog().get_work(work_id).await? else {
        return Err(format!("work {id} not found").into());
    };
    let work = &entry.work;
    println!("{} - {}", work.title(), entry.author.name());
    if let Some(genre) = work.genre() {
        println!("genre: {genre}");
    }
    if let Some(description) = work.description() {
        println!("\n{description}");
    }
    if let Some(summary) = work.summary() {
        println!("\nsummary: {summary}");
    }
    if !work.quotes().is_empty() {
        println!("\nquotes:");
        for quote in work.quotes() {
            println!("  «{quote}»");
        }
    }
    let quizzes = app.catalog().list_quizzes(QuizFilter::by_work(work_id)).await;
    if !quizzes.is_empty() {
        println!("\nquizzes:");
        for quiz in quizzes {
            println!(
                "  [{}] {} ({} questions, {})",
                quiz.id.value(),
                quiz.title,
                quiz.question_count,
                quiz.difficulty.as_str()
            );
        }
    }
    Ok(())
}

/// Page movement requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Stay,
    Next,
    Previous,
    To(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub font_size: Option<f32>,
    pub line_height: Option<f32>,
    pub width: f32,
    pub height: f32,
}

pub async fn read(app: &AppServices, user: u64, work: u64, step: Move, viewport: Viewport) -> CmdResult {
    let prefs = app.progress().cache().prefs().unwrap_or_default();
    let prefs = ReaderPrefs {
        font_size: viewport.font_size.unwrap_or(prefs.font_size),
        line_height: viewport.line_height.unwrap_or(prefs.line_height),
    };
    let layout = LayoutSettings::new(
        prefs.font_size,
        prefs.line_height,
        viewport.width,
        viewport.height,
    )?;

    let mut session = app
        .reader()
        .open(
            UserId::new(user),
            WorkId::new(work),
            layout,
            Box::new(LineMetrics::default()),
        )
        .await?;
    if viewport.font_size.is_some() || viewport.line_height.is_some() {
        if let Err(err) = app.progress().cache().set_prefs(prefs) {
            warn!(error = %err, "failed to remember reader preferences");
        }
    }

    match step {
        Move::Stay => {}
        Move::Next => {
            session.next_page().await?;
        }
        Move::Previous => {
            session.previous_page().await?;
        }
        Move::To(page) => {
            session.go_to(page).await?;
        }
    }

    println!("{}", session.work().work.title());
    println!(
        "page {} of {} ({}%)",
        session.current_page(),
        session.total_pages(),
        session.percentage()
    );
    println!();
    for paragraph in session.current_paragraphs() {
        println!("{paragraph}\n");
    }
    if session.is_placeholder() {
        println!("(this work has no text yet)");
    } else if session.is_last_page() {
        println!("(end of text)");
    }
    Ok(())
}

pub async fn progress(app: &AppServices, user: u64) -> CmdResult {
    let user = UserId::new(user);
    let items = app.progress().progress_list(user).await;
    if items.is_empty() {
        println!("no reading progress yet");
    }
    for item in items {
        let title = item.title.as_deref().unwrap_or("(unknown work)");
        let status = if item.record.completed { "done" } else { "reading" };
        println!(
            "{:>3}%  page {}/{}  {:<7}  {}",
            item.display_percentage,
            item.record.current_page,
            item.display_total_pages,
            status,
            title
        );
    }

    let recent = app.progress().recently_read(user, RECENTLY_READ_LIMIT).await;
    if !recent.is_empty() {
        println!("\ncontinue reading:");
        for entry in recent {
            println!(
                "  {} (page {})",
                entry.work.work.title(),
                entry.record.current_page
            );
        }
    }
    Ok(())
}

pub async fn stats(app: &AppServices, user: u64) -> CmdResult {
    let stats = app.progress().reading_stats(UserId::new(user)).await;
    println!(
        "read {} of {} curriculum works ({}%)",
        stats.read, stats.total, stats.percentage
    );
    Ok(())
}

pub async fn results(app: &AppServices, user: u64) -> CmdResult {
    let rows = app.results().list_results(UserId::new(user)).await;
    if rows.is_empty() {
        println!("no results yet");
    }
    for row in rows {
        let title = row
            .title
            .clone()
            .unwrap_or_else(|| format!("Test #{}", row.test.to_raw()));
        let when = row
            .completed_at
            .map_or_else(|| "-".to_owned(), |at| at.format("%Y-%m-%d %H:%M").to_string());
        println!(
            "{when}  {}/{}  {title}",
            row.score,
            row.max_score.unwrap_or(services::DEFAULT_QUIZ_MAX_SCORE)
        );
    }
    Ok(())
}

pub async fn recommend(app: &AppServices, query: &str) -> CmdResult {
    let result = app.recommendations().recommend(query).await;
    for title in &result.recommendations {
        println!("- {title}");
    }
    println!("\n{}", result.explanation);
    Ok(())
}

pub async fn analyze(app: &AppServices, text: &str) -> CmdResult {
    let analysis = app.recommendations().analyze_text(text).await;
    println!("{}", analysis.summary);
    if !analysis.themes.is_empty() {
        println!("\nthemes: {}", analysis.themes.join(", "));
    }
    println!("\n{}", analysis.recommendation);
    Ok(())
}
