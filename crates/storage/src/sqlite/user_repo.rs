use quest_core::model::{User, Username};

use super::SqliteRepository;
use super::mapping::{db_err, map_user_row};
use crate::repository::{StorageError, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, username: &Username) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT username, role, grade
            FROM users WHERE username = ?1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT username, role, grade
            FROM users
            ORDER BY username ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_user_row).collect()
    }

    async fn put_user(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO users (username, role, grade)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(username) DO UPDATE SET
                role = excluded.role,
                grade = excluded.grade
            ",
        )
        .bind(user.username().as_str())
        .bind(user.role().as_str())
        .bind(user.grade())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn add_user(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO users (username, role, grade)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(user.username().as_str())
        .bind(user.role().as_str())
        .bind(user.grade())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}
