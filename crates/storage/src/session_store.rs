//! Persistence for the single session token holding the logged-in user.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::repository::StorageError;

/// One ambient key holding the serialized session, if any.
///
/// The store does not interpret the payload; parsing belongs to the caller.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the raw token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the token cannot be read.
    async fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the token cannot be written.
    async fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the token. Clearing an absent token is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the token cannot be removed.
    async fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    token: Arc<Mutex<Option<String>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        let guard = self
            .token
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save(&self, token: &str) -> Result<(), StorageError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        *guard = Some(token.to_owned());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Keeps the token in a small file so it survives between command runs.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_err(e: std::io::Error) -> StorageError {
    StorageError::Unavailable(e.to_string())
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(e)),
        }
    }

    async fn save(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&self.path, token).await.map_err(io_err)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(io_err(e)),
            _ => Ok(()),
        }
    }
}
