use lit_core::model::{Author, Category, Quiz, QuizFilter, QuizId, Work, WorkId, WorkWithAuthor};

use super::SqliteRepository;
use super::mapping::{
    WORK_COLUMNS, conn, id_to_i64, map_author_row, map_quiz_row, map_work_row, ser,
};
use crate::repository::{CatalogRepository, StorageError};

const QUIZ_COLUMNS: &str = r"
    id, title, work_id, question_count, difficulty, quiz_type, special_icon, questions, time_minutes
";

#[async_trait::async_trait]
impl CatalogRepository for SqliteRepository {
    async fn upsert_author(&self, author: &Author) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO authors (id, name) VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name
            ",
        )
        .bind(id_to_i64("author_id", author.id().value())?)
        .bind(author.name())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn upsert_work(&self, work: &Work) -> Result<(), StorageError> {
        let quotes = serde_json::to_string(work.quotes()).map_err(ser)?;
        let full_text = Some(work.full_text()).filter(|t| !t.is_empty());

        let res = sqlx::query(
            r"
            INSERT INTO works (
                id, title, author_id, description, category, year, genre,
                full_text, summary, characters, themes, quotes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                author_id = excluded.author_id,
                description = excluded.description,
                category = excluded.category,
                year = excluded.year,
                genre = excluded.genre,
                full_text = excluded.full_text,
                summary = excluded.summary,
                characters = excluded.characters,
                themes = excluded.themes,
                quotes = excluded.quotes
            ",
        )
        .bind(id_to_i64("work_id", work.id().value())?)
        .bind(work.title())
        .bind(id_to_i64("author_id", work.author_id().value())?)
        .bind(work.description())
        .bind(work.category().map(Category::as_str))
        .bind(work.year())
        .bind(work.genre())
        .bind(full_text)
        .bind(work.summary())
        .bind(work.characters())
        .bind(work.themes())
        .bind(quotes)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(StorageError::NotFound)
            }
            Err(e) => Err(conn(e)),
        }
    }

    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quizzes (
                id, title, work_id, question_count, difficulty, quiz_type,
                special_icon, questions, time_minutes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                work_id = excluded.work_id,
                question_count = excluded.question_count,
                difficulty = excluded.difficulty,
                quiz_type = excluded.quiz_type,
                special_icon = excluded.special_icon,
                questions = excluded.questions,
                time_minutes = excluded.time_minutes
            ",
        )
        .bind(id_to_i64("quiz_id", quiz.id.value())?)
        .bind(&quiz.title)
        .bind(
            quiz.work_id
                .map(|w| id_to_i64("work_id", w.value()))
                .transpose()?,
        )
        .bind(i64::from(quiz.question_count))
        .bind(quiz.difficulty.as_str())
        .bind(quiz.quiz_type.as_str())
        .bind(quiz.special_icon.as_deref())
        .bind(quiz.questions.as_deref())
        .bind(quiz.time_minutes.map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn list_authors(&self) -> Result<Vec<Author>, StorageError> {
        let rows = sqlx::query("SELECT id, name FROM authors ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        rows.iter().map(map_author_row).collect()
    }

    async fn list_works(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<WorkWithAuthor>, StorageError> {
        let sql = format!(
            r"
            SELECT {WORK_COLUMNS}
            FROM works w JOIN authors a ON a.id = w.author_id
            WHERE ?1 IS NULL OR w.category = ?1
            ORDER BY w.id ASC
            "
        );
        let rows = sqlx::query(&sql)
            .bind(category.map(Category::as_str))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        rows.iter().map(map_work_row).collect()
    }

    async fn get_work(&self, id: WorkId) -> Result<Option<WorkWithAuthor>, StorageError> {
        let sql = format!(
            r"
            SELECT {WORK_COLUMNS}
            FROM works w JOIN authors a ON a.id = w.author_id
            WHERE w.id = ?1
            "
        );
        let row = sqlx::query(&sql)
            .bind(id_to_i64("work_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        row.as_ref().map(map_work_row).transpose()
    }

    async fn list_quizzes(&self, filter: &QuizFilter) -> Result<Vec<Quiz>, StorageError> {
        let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes ORDER BY id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        let mut quizzes = Vec::with_capacity(rows.len());
        for row in &rows {
            let quiz = map_quiz_row(row)?;
            if filter.matches(&quiz) {
                quizzes.push(quiz);
            }
        }
        Ok(quizzes)
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_to_i64("quiz_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        row.as_ref().map(map_quiz_row).transpose()
    }
}
