use lit_core::model::{NewTestResult, TestResult, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_result_row, ser};
use crate::repository::{ResultRepository, StorageError};

#[async_trait::async_trait]
impl ResultRepository for SqliteRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<TestResult>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, test_id, score, completed, completed_at, metadata, title, max_score
            FROM test_results
            WHERE user_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;
        rows.iter().map(map_result_row).collect()
    }

    async fn create(&self, result: NewTestResult) -> Result<TestResult, StorageError> {
        let metadata = result
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(ser)?;

        let res = sqlx::query(
            r"
            INSERT INTO test_results (
                user_id, test_id, score, completed, completed_at, metadata, title, max_score
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(id_to_i64("user_id", result.user_id.value())?)
        .bind(id_to_i64("test_id", result.test.to_raw())?)
        .bind(i64::from(result.score))
        .bind(i64::from(result.completed))
        .bind(result.completed_at)
        .bind(metadata)
        .bind(result.title.as_deref())
        .bind(result.max_score.map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let id = u64::try_from(res.last_insert_rowid())
            .map_err(|_| StorageError::Serialization("result id sign overflow".into()))?;
        Ok(result.assign_id(lit_core::model::ResultId::new(id)))
    }
}
