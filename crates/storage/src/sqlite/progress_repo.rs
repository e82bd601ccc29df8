use quest_core::model::{Progress, Username};

use super::SqliteRepository;
use super::mapping::{db_err, lessons_to_json, map_progress_row, xp_to_i64};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(&self, username: &Username) -> Result<Option<Progress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT username, xp, completed_lessons
            FROM progress WHERE username = ?1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn list_progress(&self) -> Result<Vec<Progress>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT username, xp, completed_lessons
            FROM progress
            ORDER BY username ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_progress_row).collect()
    }

    async fn put_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        // xp and lessons land in one statement, so readers never see half an update
        sqlx::query(
            r"
            INSERT INTO progress (username, xp, completed_lessons)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(username) DO UPDATE SET
                xp = excluded.xp,
                completed_lessons = excluded.completed_lessons
            ",
        )
        .bind(progress.username().as_str())
        .bind(xp_to_i64(progress.xp())?)
        .bind(lessons_to_json(progress)?)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn add_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO progress (username, xp, completed_lessons)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(progress.username().as_str())
        .bind(xp_to_i64(progress.xp())?)
        .bind(lessons_to_json(progress)?)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}
