use std::sync::Arc;

use tracing::{debug, info, warn};

use quest_core::model::{Role, Username};
use quest_core::session::{SessionContext, SessionError};
use storage::repository::UserRepository;
use storage::session_store::SessionStore;

use crate::error::LoginError;

/// Why a protected view sent the visitor back to login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// No session, or a session with the wrong role.
    InvalidSession,
    /// The stored session could not be parsed.
    MalformedSession,
}

/// Outcome of gating a protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAccess {
    Granted(SessionContext),
    RedirectToLogin(RedirectReason),
}

impl ViewAccess {
    #[must_use]
    pub fn granted(self) -> Option<SessionContext> {
        match self {
            ViewAccess::Granted(ctx) => Some(ctx),
            ViewAccess::RedirectToLogin(_) => None,
        }
    }
}

/// Login, logout and the session check run by each protected view.
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserRepository>,
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, store: Arc<dyn SessionStore>) -> Self {
        Self { users, store }
    }

    /// Look the user up by name and start a session. There is no password.
    ///
    /// # Errors
    ///
    /// Returns `LoginError::EmptyUsername` for blank input,
    /// `LoginError::UnknownUser` if no such user exists, and
    /// `LoginError::Storage` if the lookup or the session write fails.
    pub async fn login(&self, raw_username: &str) -> Result<SessionContext, LoginError> {
        let username = Username::new(raw_username).map_err(|_| LoginError::EmptyUsername)?;
        let user = self
            .users
            .get_user(&username)
            .await?
            .ok_or_else(|| LoginError::UnknownUser(username.to_string()))?;

        let ctx = SessionContext::new(user);
        self.store.save(&ctx.to_json()?).await?;
        info!(%username, role = %ctx.role(), "logged in");
        Ok(ctx)
    }

    /// End the current session, if any.
    ///
    /// # Errors
    ///
    /// Returns `LoginError::Storage` if the session token cannot be removed.
    pub async fn logout(&self) -> Result<(), LoginError> {
        self.store.clear().await?;
        info!("logged out");
        Ok(())
    }

    /// The session stored by the last login.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Missing` when nobody is logged in (or the token
    /// cannot be read) and `SessionError::Malformed` when it cannot be parsed.
    pub async fn current(&self) -> Result<SessionContext, SessionError> {
        let raw = match self.store.load().await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Err(SessionError::Missing),
            Err(err) => {
                warn!(error = %err, "session token unreadable");
                return Err(SessionError::Missing);
            }
        };
        SessionContext::from_json(&raw)
    }

    /// Gate a view that only `role` may open.
    pub async fn require(&self, role: Role) -> ViewAccess {
        let checked = self.current().await.and_then(|ctx| {
            ctx.require(role)?;
            Ok(ctx)
        });
        match checked {
            Ok(ctx) => ViewAccess::Granted(ctx),
            Err(SessionError::Malformed(detail)) => {
                warn!(%detail, "discarding malformed session");
                ViewAccess::RedirectToLogin(RedirectReason::MalformedSession)
            }
            Err(err) => {
                debug!(error = %err, required = %role, "redirecting to login");
                ViewAccess::RedirectToLogin(RedirectReason::InvalidSession)
            }
        }
    }
}
