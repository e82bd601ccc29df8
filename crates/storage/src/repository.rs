use async_trait::async_trait;
use quest_core::model::{Progress, User, Username};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
///
/// A missing record is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("a record with this key already exists")]
    Conflict,

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The `users` collection, keyed by username.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get_user(&self, username: &Username) -> Result<Option<User>, StorageError>;

    /// Snapshot of every user, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn list_users(&self) -> Result<Vec<User>, StorageError>;

    /// Insert or replace the user with the same username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn put_user(&self, user: &User) -> Result<(), StorageError>;

    /// Insert a user that must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken; the stored
    /// record is left untouched.
    async fn add_user(&self, user: &User) -> Result<(), StorageError>;
}

/// The `progress` collection, keyed by username.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the progress record of a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get_progress(&self, username: &Username) -> Result<Option<Progress>, StorageError>;

    /// Snapshot of every progress record, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn list_progress(&self) -> Result<Vec<Progress>, StorageError>;

    /// Insert or replace the record for the same username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn put_progress(&self, progress: &Progress) -> Result<(), StorageError>;

    /// Insert a record that must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a record for this username exists.
    async fn add_progress(&self, progress: &Progress) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Clones share the same maps. Listing order is by username.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<BTreeMap<Username, User>>>,
    progress: Arc<Mutex<BTreeMap<Username, Progress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(BTreeMap::new())),
            progress: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Unavailable(e.to_string())
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, username: &Username) -> Result<Option<User>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.get(username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }

    async fn put_user(&self, user: &User) -> Result<(), StorageError> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        guard.insert(user.username().clone(), user.clone());
        Ok(())
    }

    async fn add_user(&self, user: &User) -> Result<(), StorageError> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        if guard.contains_key(user.username()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(user.username().clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self, username: &Username) -> Result<Option<Progress>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.get(username).cloned())
    }

    async fn list_progress(&self) -> Result<Vec<Progress>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }

    async fn put_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.insert(progress.username().clone(), progress.clone());
        Ok(())
    }

    async fn add_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        if guard.contains_key(progress.username()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(progress.username().clone(), progress.clone());
        Ok(())
    }
}

/// Stand-in used when the real store could not be opened.
///
/// Every call fails with `StorageError::Unavailable` so callers fall back to
/// their documented defaults.
#[derive(Debug, Clone)]
pub struct UnavailableRepository {
    reason: String,
}

impl UnavailableRepository {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn err(&self) -> StorageError {
        StorageError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl UserRepository for UnavailableRepository {
    async fn get_user(&self, _username: &Username) -> Result<Option<User>, StorageError> {
        Err(self.err())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        Err(self.err())
    }

    async fn put_user(&self, _user: &User) -> Result<(), StorageError> {
        Err(self.err())
    }

    async fn add_user(&self, _user: &User) -> Result<(), StorageError> {
        Err(self.err())
    }
}

#[async_trait]
impl ProgressRepository for UnavailableRepository {
    async fn get_progress(&self, _username: &Username) -> Result<Option<Progress>, StorageError> {
        Err(self.err())
    }

    async fn list_progress(&self) -> Result<Vec<Progress>, StorageError> {
        Err(self.err())
    }

    async fn put_progress(&self, _progress: &Progress) -> Result<(), StorageError> {
        Err(self.err())
    }

    async fn add_progress(&self, _progress: &Progress) -> Result<(), StorageError> {
        Err(self.err())
    }
}

/// Aggregates user and progress repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { users, progress }
    }

    /// A storage whose every operation reports `StorageError::Unavailable`.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let repo = UnavailableRepository::new(reason);
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { users, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_core::model::LessonId;

    fn name(raw: &str) -> Username {
        Username::new(raw).unwrap()
    }

    #[tokio::test]
    async fn round_trips_both_collections() {
        let repo = InMemoryRepository::new();
        let user = User::student(name("student1"), "6");
        repo.put_user(&user).await.unwrap();
        assert_eq!(repo.get_user(&name("student1")).await.unwrap(), Some(user));

        let progress = Progress::from_persisted(
            name("student1"),
            30,
            [LessonId::new("components-cell").unwrap()],
        );
        repo.put_progress(&progress).await.unwrap();
        assert_eq!(
            repo.get_progress(&name("student1")).await.unwrap(),
            Some(progress)
        );
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_user(&name("nobody")).await.unwrap().is_none());
        assert!(repo.get_progress(&name("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_refuses_to_overwrite() {
        let repo = InMemoryRepository::new();
        repo.add_user(&User::student(name("student1"), "6"))
            .await
            .unwrap();

        let err = repo
            .add_user(&User::student(name("student1"), "7"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        let kept = repo.get_user(&name("student1")).await.unwrap().unwrap();
        assert_eq!(kept.grade(), Some("6"));
    }

    #[tokio::test]
    async fn put_overwrites() {
        let repo = InMemoryRepository::new();
        repo.put_progress(&Progress::from_persisted(name("student1"), 10, []))
            .await
            .unwrap();
        repo.put_progress(&Progress::from_persisted(name("student1"), 20, []))
            .await
            .unwrap();

        let all = repo.list_progress().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].xp(), 20);
    }

    #[tokio::test]
    async fn clones_share_data() {
        let storage = Storage::in_memory();
        let other = storage.clone();
        storage
            .users
            .put_user(&User::teacher(name("teacher")))
            .await
            .unwrap();
        assert_eq!(other.users.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unavailable_storage_reports_unavailable() {
        let storage = Storage::unavailable("disabled");
        let err = storage.users.list_users().await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(reason) if reason == "disabled"));
        let err = storage
            .progress
            .get_progress(&name("student1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
