use std::sync::Arc;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use quest_core::roster::{RosterRow, build_roster};
use storage::repository::{ProgressRepository, UserRepository};

use crate::error::RosterError;
use crate::events::ProgressUpdated;
use crate::progress_service::ProgressService;

/// Builds the teacher's ranked list of students.
#[derive(Clone)]
pub struct RosterService {
    users: Arc<dyn UserRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl RosterService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { users, progress }
    }

    /// Recompute the roster from both collections.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` if either collection cannot be read.
    pub async fn try_build_roster(&self) -> Result<Vec<RosterRow>, RosterError> {
        let users = self.users.list_users().await?;
        let progress = self.progress.list_progress().await?;
        Ok(build_roster(&users, &progress))
    }

    /// Recompute the roster; an unreadable store yields an empty roster.
    pub async fn build_roster(&self) -> Vec<RosterRow> {
        self.try_build_roster().await.unwrap_or_else(|err| {
            warn!(error = %err, "roster unavailable, showing no students");
            Vec::new()
        })
    }

    /// A teacher view that rebuilds after any `progress-updated` signal.
    #[must_use]
    pub fn watch(&self, progress: &ProgressService) -> RosterWatch {
        RosterWatch {
            service: self.clone(),
            updates: progress.subscribe(),
            stale: true,
            rows: Vec::new(),
        }
    }
}

/// Displayed roster that knows when it is out of date.
///
/// Dropping the watch unsubscribes it.
pub struct RosterWatch {
    service: RosterService,
    updates: broadcast::Receiver<ProgressUpdated>,
    stale: bool,
    rows: Vec<RosterRow>,
}

impl RosterWatch {
    /// True before the first build and after any pending progress update.
    pub fn is_stale(&mut self) -> bool {
        self.drain_updates();
        self.stale
    }

    /// Current rows, rebuilding first if progress changed since the last build.
    pub async fn refresh(&mut self) -> &[RosterRow] {
        if self.is_stale() {
            self.rows = self.service.build_roster().await;
            self.stale = false;
        }
        &self.rows
    }

    fn drain_updates(&mut self) {
        loop {
            match self.updates.try_recv() {
                Ok(event) => {
                    debug!(username = %event.username, "roster marked stale");
                    self.stale = true;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "roster watch lagged");
                    self.stale = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quest_core::model::{LessonId, Progress, User, Username};
    use storage::repository::{InMemoryRepository, Storage};

    fn name(raw: &str) -> Username {
        Username::new(raw).unwrap()
    }

    async fn demo_repo() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        repo.put_user(&User::student(name("student1"), "6"))
            .await
            .unwrap();
        repo.put_user(&User::student(name("student2"), "6"))
            .await
            .unwrap();
        repo.put_user(&User::teacher(name("teacher"))).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn joins_users_with_progress() {
        let repo = demo_repo().await;
        repo.put_progress(&Progress::from_persisted(
            name("student1"),
            40,
            [LessonId::new("a").unwrap()],
        ))
        .await
        .unwrap();
        let service = RosterService::new(Arc::new(repo.clone()), Arc::new(repo));

        let rows = service.try_build_roster().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].username, name("student1"));
        assert_eq!((rows[0].xp, rows[0].lessons_completed), (40, 1));
        assert_eq!(rows[1].username, name("student2"));
        assert_eq!((rows[1].xp, rows[1].lessons_completed), (0, 0));
    }

    #[tokio::test]
    async fn unavailable_store_gives_empty_roster() {
        let storage = Storage::unavailable("blocked");
        let service = RosterService::new(storage.users, storage.progress);
        assert!(service.build_roster().await.is_empty());
        assert!(service.try_build_roster().await.is_err());
    }

    #[tokio::test]
    async fn watch_rebuilds_after_progress_update() {
        let repo = demo_repo().await;
        let progress = ProgressService::new(Arc::new(repo.clone()));
        let roster = RosterService::new(Arc::new(repo.clone()), Arc::new(repo));
        let mut watch = roster.watch(&progress);

        assert!(watch.is_stale());
        assert!(watch.refresh().await.iter().all(|r| r.xp == 0));
        assert!(!watch.is_stale());

        progress
            .record_quiz_completion(&name("student2"), LessonId::new("components-cell").unwrap(), 30)
            .await
            .unwrap();
        assert!(watch.is_stale());

        let rows = watch.refresh().await;
        assert_eq!(rows[0].username, name("student2"));
        assert_eq!(rows[0].xp, 30);
    }

    #[tokio::test]
    async fn watch_that_fell_behind_still_rebuilds() {
        let repo = demo_repo().await;
        let progress = ProgressService::new(Arc::new(repo.clone()));
        let roster = RosterService::new(Arc::new(repo.clone()), Arc::new(repo));
        let mut watch = roster.watch(&progress);
        watch.refresh().await;

        for _ in 0..40 {
            progress
                .record_quiz_completion(&name("student1"), LessonId::new("components-cell").unwrap(), 10)
                .await
                .unwrap();
        }

        assert!(watch.is_stale());
        let rows = watch.refresh().await;
        assert_eq!(rows[0].username, name("student1"));
        assert_eq!(rows[0].xp, 400);
        assert!(!watch.is_stale());
    }

    #[tokio::test]
    async fn dropping_watch_unsubscribes() {
        let repo = demo_repo().await;
        let progress = ProgressService::new(Arc::new(repo.clone()));
        let roster = RosterService::new(Arc::new(repo.clone()), Arc::new(repo));

        let watch = roster.watch(&progress);
        assert_eq!(progress.events().listener_count(), 1);
        drop(watch);
        assert_eq!(progress.events().listener_count(), 0);
    }
}
