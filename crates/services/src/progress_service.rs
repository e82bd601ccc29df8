use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{info, warn};

use quest_core::leveling::{LevelState, compute_level};
use quest_core::model::{LessonId, Progress, Username};
use storage::repository::ProgressRepository;

use crate::error::ProgressError;
use crate::events::{ProgressEvents, ProgressUpdated};

/// Progress plus where it puts the student on the level curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSummary {
    pub progress: Progress,
    pub level: LevelState,
}

/// Single source of truth for a student's XP and completed lessons.
///
/// Owns the `progress-updated` channel; every successful quiz completion is
/// announced to current subscribers.
pub struct ProgressService {
    progress: Arc<dyn ProgressRepository>,
    events: ProgressEvents,
    // one read-modify-write at a time through this service
    write_lock: Mutex<()>,
}

impl ProgressService {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            progress,
            events: ProgressEvents::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Fetch a student's progress, or a zero record if none is stored.
    ///
    /// Never writes. Storage failures are logged and yield the zero record.
    pub async fn load_progress(&self, username: &Username) -> Progress {
        match self.try_load_progress(username).await {
            Ok(progress) => progress,
            Err(err) => {
                warn!(%username, error = %err, "progress unavailable, showing defaults");
                Progress::new(username.clone())
            }
        }
    }

    /// Like [`Self::load_progress`] but reports storage failures.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read.
    pub async fn try_load_progress(&self, username: &Username) -> Result<Progress, ProgressError> {
        let stored = self.progress.get_progress(username).await?;
        Ok(stored.unwrap_or_else(|| Progress::new(username.clone())))
    }

    /// Credit a finished quiz and announce the change.
    ///
    /// `earned_xp` is added on every call, retakes included. The lesson is
    /// added to the completed set once. The updated record is written in a
    /// single `put`; nothing is announced if the write fails.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read or written.
    pub async fn record_quiz_completion(
        &self,
        username: &Username,
        lesson: LessonId,
        earned_xp: u64,
    ) -> Result<Progress, ProgressError> {
        let updated = {
            let _guard = self.write_lock.lock().await;
            let mut progress = self.try_load_progress(username).await?;
            let first_time = progress.apply_quiz_completion(lesson.clone(), earned_xp);
            self.progress.put_progress(&progress).await?;
            info!(
                %username,
                %lesson,
                earned_xp,
                total_xp = progress.xp(),
                first_time,
                "recorded quiz completion"
            );
            progress
        };

        self.events.emit(ProgressUpdated {
            username: username.clone(),
        });
        Ok(updated)
    }

    /// Progress and level for a student's dashboard.
    pub async fn summary(&self, username: &Username) -> StudentSummary {
        let progress = self.load_progress(username).await;
        let level = compute_level(progress.xp());
        StudentSummary { progress, level }
    }

    /// Listen for `progress-updated` until the receiver is dropped.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressUpdated> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn events(&self) -> &ProgressEvents {
        &self.events
    }
}
