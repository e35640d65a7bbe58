use lit_core::model::{ProgressId, ProgressPatch, ProgressRecord, ProgressUpdate, UserId, WorkId};
use sqlx::{Sqlite, Transaction};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_progress_row};
use crate::repository::{NewProgressRecord, ProgressRepository, StorageError};

const PROGRESS_COLUMNS: &str = r"
    id, user_id, work_id, percentage, current_page, total_pages, last_read_at, completed
";

async fn insert(
    tx: &mut Transaction<'_, Sqlite>,
    record: &NewProgressRecord,
) -> Result<i64, StorageError> {
    let update = record.update;
    let res = sqlx::query(
        r"
        INSERT INTO reading_progress (
            user_id, work_id, percentage, current_page, total_pages, last_read_at, completed
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ",
    )
    .bind(id_to_i64("user_id", record.user_id.value())?)
    .bind(id_to_i64("work_id", record.work_id.value())?)
    .bind(i64::from(update.percentage))
    .bind(i64::from(update.current_page))
    .bind(i64::from(update.total_pages))
    .bind(update.last_read_at)
    .bind(i64::from(update.completed))
    .execute(&mut **tx)
    .await
    .map_err(conn)?;
    Ok(res.last_insert_rowid())
}

async fn fetch(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
) -> Result<ProgressRecord, StorageError> {
    let sql = format!("SELECT {PROGRESS_COLUMNS} FROM reading_progress WHERE id = ?1");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;
    map_progress_row(&row)
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM reading_progress WHERE user_id = ?1 ORDER BY id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(id_to_i64("user_id", user_id.value())?)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        rows.iter().map(map_progress_row).collect()
    }

    async fn create(&self, record: NewProgressRecord) -> Result<ProgressRecord, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let id = insert(&mut tx, &record).await?;
        let row = fetch(&mut tx, id).await?;
        tx.commit().await.map_err(conn)?;
        Ok(row)
    }

    async fn update(
        &self,
        id: ProgressId,
        patch: ProgressPatch,
    ) -> Result<ProgressRecord, StorageError> {
        let id = id_to_i64("progress_id", id.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let res = sqlx::query(
            r"
            UPDATE reading_progress SET
                percentage = COALESCE(MIN(?2, 100), percentage),
                current_page = COALESCE(?3, current_page),
                total_pages = COALESCE(?4, total_pages),
                last_read_at = COALESCE(?5, last_read_at),
                completed = COALESCE(?6, completed)
            WHERE id = ?1
            ",
        )
        .bind(id)
        .bind(patch.percentage.map(i64::from))
        .bind(patch.current_page.map(i64::from))
        .bind(patch.total_pages.map(i64::from))
        .bind(patch.last_read_at)
        .bind(patch.completed.map(i64::from))
        .execute(&mut *tx)
        .await
        .map_err(conn)?;
        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        let row = fetch(&mut tx, id).await?;
        tx.commit().await.map_err(conn)?;
        Ok(row)
    }

    async fn upsert_latest(
        &self,
        user_id: UserId,
        work_id: WorkId,
        update: ProgressUpdate,
    ) -> Result<ProgressRecord, StorageError> {
        let user = id_to_i64("user_id", user_id.value())?;
        let work = id_to_i64("work_id", work_id.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        // Writing first takes the database write lock, so the check and the
        // insert below cannot interleave with another writer.
        let latest: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE reading_progress SET
                percentage = ?3,
                current_page = ?4,
                total_pages = ?5,
                last_read_at = ?6,
                completed = ?7
            WHERE id = (
                SELECT id FROM reading_progress
                WHERE user_id = ?1 AND work_id = ?2
                ORDER BY last_read_at DESC, id DESC
                LIMIT 1
            )
            RETURNING id
            ",
        )
        .bind(user)
        .bind(work)
        .bind(i64::from(update.percentage))
        .bind(i64::from(update.current_page))
        .bind(i64::from(update.total_pages))
        .bind(update.last_read_at)
        .bind(i64::from(update.completed))
        .fetch_optional(&mut *tx)
        .await
        .map_err(conn)?;

        let id = match latest {
            Some(id) => id,
            None => {
                let record = NewProgressRecord {
                    user_id,
                    work_id,
                    update,
                };
                insert(&mut tx, &record).await?
            }
        };
        let row = fetch(&mut tx, id).await?;
        tx.commit().await.map_err(conn)?;
        Ok(row)
    }
}
