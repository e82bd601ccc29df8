use quest_core::model::{LessonId, Progress, Role, User, Username};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps driver errors; a primary-key violation means the record already exists.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => StorageError::Unavailable(e.to_string()),
    }
}

pub(crate) fn xp_to_i64(xp: u64) -> Result<i64, StorageError> {
    i64::try_from(xp).map_err(|_| StorageError::Serialization("xp overflow".into()))
}

fn xp_from_i64(v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid xp: {v}")))
}

/// `completed_lessons` is stored as a JSON array of lesson ids.
pub(crate) fn lessons_to_json(progress: &Progress) -> Result<String, StorageError> {
    serde_json::to_string(progress.completed_lessons()).map_err(ser)
}

fn lessons_from_json(raw: &str) -> Result<Vec<LessonId>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<User, StorageError> {
    let username = Username::new(row.try_get::<String, _>("username").map_err(ser)?)
        .map_err(ser)?;
    let role: Role = row
        .try_get::<String, _>("role")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let grade: Option<String> = row.try_get("grade").map_err(ser)?;

    User::new(username, role, grade).map_err(ser)
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<Progress, StorageError> {
    let username = Username::new(row.try_get::<String, _>("username").map_err(ser)?)
        .map_err(ser)?;
    let xp = xp_from_i64(row.try_get::<i64, _>("xp").map_err(ser)?)?;
    let lessons = lessons_from_json(&row.try_get::<String, _>("completed_lessons").map_err(ser)?)?;

    Ok(Progress::from_persisted(username, xp, lessons))
}
