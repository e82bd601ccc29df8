use std::sync::Arc;

use tracing::{error, warn};

use storage::repository::Storage;
use storage::seed::{SeedReport, seed_defaults};
use storage::session_store::SessionStore;

use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::quiz_service::QuizService;
use crate::roster_service::RosterService;
use crate::session_service::SessionService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    sessions: Arc<SessionService>,
    progress: Arc<ProgressService>,
    roster: Arc<RosterService>,
    quiz: Arc<QuizService>,
    degraded: bool,
}

impl AppServices {
    /// Wire services over `storage` and seed demo data if the store is empty.
    ///
    /// A failed seed is logged and does not stop startup.
    pub async fn start(storage: Storage, session_store: Arc<dyn SessionStore>) -> Self {
        let services = Self::assemble(storage, session_store, false);
        if let Err(err) = services.seed().await {
            warn!(error = %err, "could not seed demo data");
        }
        services
    }

    /// Open `SQLite` storage and start services over it.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Sqlite` if the database cannot be opened or
    /// migrated.
    pub async fn new_sqlite(
        db_url: &str,
        session_store: Arc<dyn SessionStore>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::start(storage, session_store).await)
    }

    /// Like [`Self::new_sqlite`], but keeps running without a database.
    ///
    /// Reads then return their empty defaults and writes report the store as
    /// unavailable.
    pub async fn new_sqlite_or_unavailable(
        db_url: &str,
        session_store: Arc<dyn SessionStore>,
    ) -> Self {
        match Storage::sqlite(db_url).await {
            Ok(storage) => Self::start(storage, session_store).await,
            Err(err) => {
                error!(db_url, error = %err, "local store unavailable");
                Self::assemble(Storage::unavailable(err.to_string()), session_store, true)
            }
        }
    }

    fn assemble(storage: Storage, session_store: Arc<dyn SessionStore>, degraded: bool) -> Self {
        let sessions = Arc::new(SessionService::new(
            Arc::clone(&storage.users),
            session_store,
        ));
        let progress = Arc::new(ProgressService::new(Arc::clone(&storage.progress)));
        let roster = Arc::new(RosterService::new(
            Arc::clone(&storage.users),
            Arc::clone(&storage.progress),
        ));
        let quiz = Arc::new(QuizService::new(Arc::clone(&progress)));

        Self {
            storage,
            sessions,
            progress,
            roster,
            quiz,
            degraded,
        }
    }

    /// Run the first-run seeder against this storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if the store cannot be read or written.
    pub async fn seed(&self) -> Result<SeedReport, AppServicesError> {
        let report =
            seed_defaults(self.storage.users.as_ref(), self.storage.progress.as_ref()).await?;
        Ok(report)
    }

    /// True when running on the unavailable fallback store.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionService> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn roster(&self) -> Arc<RosterService> {
        Arc::clone(&self.roster)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }
}
