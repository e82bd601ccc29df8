use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::SqliteInitError;

/// Schema version this build writes.
pub const SCHEMA_VERSION: i64 = 1;

/// Runs every migration not yet recorded in `schema_migrations`.
///
/// Each step only creates what is missing, so running this against any prior
/// version, or the current one, leaves existing data alone.
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

    // Version 1: users and progress, both keyed by username.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS users (
                    username TEXT PRIMARY KEY NOT NULL,
                    role TEXT NOT NULL CHECK (role IN ('student', 'teacher')),
                    grade TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS progress (
                    username TEXT PRIMARY KEY NOT NULL,
                    xp INTEGER NOT NULL CHECK (xp >= 0),
                    completed_lessons TEXT NOT NULL DEFAULT '[]'
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

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
        debug!(version = 1, "applied schema migration");
    }

    Ok(())
}

pub async fn current_version(pool: &SqlitePool) -> Result<Option<i64>, SqliteInitError> {
    let row = sqlx::query("SELECT MAX(version) AS version FROM schema_migrations")
        .fetch_one(pool)
        .await?;
    Ok(row.try_get::<Option<i64>, _>("version")?)
}
