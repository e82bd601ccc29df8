//! Shared error types for the services crate.

use thiserror::Error;

use quest_core::model::LessonId;
use quest_core::session::SessionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Message shown to a user when a write could not be completed.
pub const RETRY_MESSAGE: &str = "Something went wrong while saving. Please try again.";

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RosterService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RosterError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SessionService::login` and `logout`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoginError {
    #[error("Enter username")]
    EmptyUsername,
    #[error("User not found. Try student1, student2, or teacher")]
    UnknownUser(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no lesson named {0}")]
    UnknownLesson(LessonId),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LoginError {
    /// Text suitable for the login form. Storage failures collapse to a retry hint.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LoginError::Storage(_) => RETRY_MESSAGE.to_owned(),
            other => other.to_string(),
        }
    }
}

impl QuizError {
    /// Text suitable for the quiz page. Storage failures collapse to a retry hint.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            QuizError::Progress(_) => RETRY_MESSAGE.to_owned(),
            other => other.to_string(),
        }
    }
}
