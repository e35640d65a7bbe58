use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Applies versioned migrations recorded in `schema_migrations`.
///
/// Version 1 creates the catalog (authors, works, quizzes), reading progress
/// and test results.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        let statements = [
            r"
                CREATE TABLE IF NOT EXISTS authors (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS works (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    author_id INTEGER NOT NULL,
                    description TEXT,
                    category TEXT CHECK (category IN ('zno', 'modern', 'classic')),
                    year INTEGER,
                    genre TEXT,
                    full_text TEXT,
                    summary TEXT,
                    characters TEXT,
                    themes TEXT,
                    quotes TEXT NOT NULL DEFAULT '[]',
                    FOREIGN KEY (author_id) REFERENCES authors(id)
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS quizzes (
                    id INTEGER PRIMARY KEY CHECK (id > 0),
                    title TEXT NOT NULL,
                    work_id INTEGER,
                    question_count INTEGER NOT NULL CHECK (question_count >= 0),
                    difficulty TEXT NOT NULL,
                    quiz_type TEXT NOT NULL,
                    special_icon TEXT,
                    questions TEXT,
                    time_minutes INTEGER CHECK (time_minutes >= 0),
                    FOREIGN KEY (work_id) REFERENCES works(id) ON DELETE SET NULL
                );
            ",
            // No unique (user_id, work_id): historical duplicates are tolerated.
            r"
                CREATE TABLE IF NOT EXISTS reading_progress (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    work_id INTEGER NOT NULL,
                    percentage INTEGER NOT NULL CHECK (percentage BETWEEN 0 AND 100),
                    current_page INTEGER NOT NULL CHECK (current_page >= 0),
                    total_pages INTEGER NOT NULL CHECK (total_pages >= 0),
                    last_read_at TEXT,
                    completed INTEGER NOT NULL DEFAULT 0,
                    FOREIGN KEY (work_id) REFERENCES works(id) ON DELETE CASCADE
                );
            ",
            r"
                CREATE TABLE IF NOT EXISTS test_results (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    test_id INTEGER NOT NULL,
                    score INTEGER NOT NULL CHECK (score >= 0),
                    completed INTEGER NOT NULL DEFAULT 1,
                    completed_at TEXT,
                    metadata TEXT,
                    title TEXT,
                    max_score INTEGER
                );
            ",
            r"
                CREATE INDEX IF NOT EXISTS idx_works_category
                    ON works(category, id);
            ",
            r"
                CREATE INDEX IF NOT EXISTS idx_progress_user_work_read
                    ON reading_progress(user_id, work_id, last_read_at);
            ",
            r"
                CREATE INDEX IF NOT EXISTS idx_results_user_completed
                    ON test_results(user_id, completed_at);
            ",
        ];
        for statement in statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
