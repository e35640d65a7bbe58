use lit_core::model::{
    Author, AuthorId, Category, ProgressId, ProgressRecord, Quiz, QuizId, ResultId, TestRef,
    TestResult, UserId, WorkDraft, WorkId, WorkWithAuthor,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

/// Columns selected by every work query, joined with `authors` as `a`.
pub(crate) const WORK_COLUMNS: &str = r"
    w.id, w.title, w.author_id, w.description, w.category, w.year, w.genre,
    w.full_text, w.summary, w.characters, w.themes, w.quotes, a.name AS author_name
";

pub(crate) fn map_work_row(row: &SqliteRow) -> Result<WorkWithAuthor, StorageError> {
    let author_id = AuthorId::new(i64_to_u64(
        "author_id",
        row.try_get::<i64, _>("author_id").map_err(ser)?,
    )?);

    let category = row
        .try_get::<Option<String>, _>("category")
        .map_err(ser)?
        .map(|raw| raw.parse::<Category>())
        .transpose()
        .map_err(ser)?;

    let quotes_json: String = row.try_get("quotes").map_err(ser)?;
    let quotes: Vec<String> = serde_json::from_str(&quotes_json).map_err(ser)?;

    let mut draft = WorkDraft::new(row.try_get::<String, _>("title").map_err(ser)?, author_id);
    draft.description = row.try_get("description").map_err(ser)?;
    draft.category = category;
    draft.year = row.try_get("year").map_err(ser)?;
    draft.genre = row.try_get("genre").map_err(ser)?;
    draft.full_text = row.try_get("full_text").map_err(ser)?;
    draft.summary = row.try_get("summary").map_err(ser)?;
    draft.characters = row.try_get("characters").map_err(ser)?;
    draft.themes = row.try_get("themes").map_err(ser)?;
    draft.quotes = quotes;

    let id = WorkId::new(i64_to_u64("id", row.try_get::<i64, _>("id").map_err(ser)?)?);
    let work = draft.validate(id).map_err(ser)?;
    let author = Author::new(author_id, row.try_get::<String, _>("author_name").map_err(ser)?)
        .map_err(ser)?;
    Ok(WorkWithAuthor { work, author })
}

pub(crate) fn map_author_row(row: &SqliteRow) -> Result<Author, StorageError> {
    let id = AuthorId::new(i64_to_u64("id", row.try_get::<i64, _>("id").map_err(ser)?)?);
    Author::new(id, row.try_get::<String, _>("name").map_err(ser)?).map_err(ser)
}

pub(crate) fn map_quiz_row(row: &SqliteRow) -> Result<Quiz, StorageError> {
    let id = QuizId::new(i64_to_u64("id", row.try_get::<i64, _>("id").map_err(ser)?)?);
    let work_id = row
        .try_get::<Option<i64>, _>("work_id")
        .map_err(ser)?
        .map(|v| i64_to_u64("work_id", v).map(WorkId::new))
        .transpose()?;
    let difficulty = row
        .try_get::<String, _>("difficulty")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let quiz_type = row
        .try_get::<String, _>("quiz_type")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    let mut quiz = Quiz::new(
        id,
        row.try_get::<String, _>("title").map_err(ser)?,
        work_id,
        i64_to_u32("question_count", row.try_get("question_count").map_err(ser)?)?,
        difficulty,
        quiz_type,
    )
    .map_err(ser)?;
    quiz.special_icon = row.try_get("special_icon").map_err(ser)?;
    quiz.questions = row.try_get("questions").map_err(ser)?;
    quiz.time_minutes = row
        .try_get::<Option<i64>, _>("time_minutes")
        .map_err(ser)?
        .map(|v| i64_to_u32("time_minutes", v))
        .transpose()?;
    Ok(quiz)
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    let percentage: i64 = row.try_get("percentage").map_err(ser)?;
    Ok(ProgressRecord {
        id: ProgressId::new(i64_to_u64("id", row.try_get("id").map_err(ser)?)?),
        user_id: UserId::new(i64_to_u64("user_id", row.try_get("user_id").map_err(ser)?)?),
        work_id: WorkId::new(i64_to_u64("work_id", row.try_get("work_id").map_err(ser)?)?),
        percentage: u8::try_from(percentage)
            .map_err(|_| StorageError::Serialization(format!("invalid percentage: {percentage}")))?,
        current_page: i64_to_u32("current_page", row.try_get("current_page").map_err(ser)?)?,
        total_pages: i64_to_u32("total_pages", row.try_get("total_pages").map_err(ser)?)?,
        last_read_at: row.try_get("last_read_at").map_err(ser)?,
        completed: row.try_get::<i64, _>("completed").map_err(ser)? != 0,
    })
}

pub(crate) fn map_result_row(row: &SqliteRow) -> Result<TestResult, StorageError> {
    let metadata = row
        .try_get::<Option<String>, _>("metadata")
        .map_err(ser)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(ser)?;
    Ok(TestResult {
        id: ResultId::new(i64_to_u64("id", row.try_get("id").map_err(ser)?)?),
        user_id: UserId::new(i64_to_u64("user_id", row.try_get("user_id").map_err(ser)?)?),
        test: TestRef::from_raw(i64_to_u64("test_id", row.try_get("test_id").map_err(ser)?)?),
        score: i64_to_u32("score", row.try_get("score").map_err(ser)?)?,
        completed: row.try_get::<i64, _>("completed").map_err(ser)? != 0,
        completed_at: row.try_get("completed_at").map_err(ser)?,
        metadata,
        title: row.try_get("title").map_err(ser)?,
        max_score: row
            .try_get::<Option<i64>, _>("max_score")
            .map_err(ser)?
            .map(|v| i64_to_u32("max_score", v))
            .transpose()?,
    })
}
