//! The logged-in user, handed explicitly to every protected view.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Role, User, Username};

/// Why a view refused a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no active session")]
    Missing,

    #[error("this view requires a {required} session, found {actual}")]
    RoleMismatch { required: Role, actual: Role },

    #[error("session data could not be read: {0}")]
    Malformed(String),
}

/// Created at login, read by views, cleared at logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionContext {
    user: User,
}

impl SessionContext {
    #[must_use]
    pub fn new(user: User) -> Self {
        Self { user }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn username(&self) -> &Username {
        self.user.username()
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.user.role()
    }

    /// Parse a stored session token.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Malformed` if the payload is not a user record.
    pub fn from_json(raw: &str) -> Result<Self, SessionError> {
        serde_json::from_str(raw).map_err(|e| SessionError::Malformed(e.to_string()))
    }

    /// Serialize for the session token store.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Malformed` if serialization fails.
    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string(self).map_err(|e| SessionError::Malformed(e.to_string()))
    }

    /// Check that this session may open a view restricted to `required`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::RoleMismatch` for the wrong role.
    pub fn require(&self, required: Role) -> Result<&Self, SessionError> {
        if self.role() == required {
            Ok(self)
        } else {
            Err(SessionError::RoleMismatch {
                required,
                actual: self.role(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_the_plain_user_record() {
        let ctx = SessionContext::new(User::student(Username::new("student1").unwrap(), "6"));
        let json = ctx.to_json().unwrap();
        assert_eq!(json, r#"{"username":"student1","role":"student","grade":"6"}"#);
        assert_eq!(SessionContext::from_json(&json).unwrap(), ctx);
    }

    #[test]
    fn garbage_is_malformed() {
        let err = SessionContext::from_json("{not json").unwrap_err();
        assert!(matches!(err, SessionError::Malformed(_)));
    }

    #[test]
    fn unknown_role_is_malformed() {
        let err = SessionContext::from_json(r#"{"username":"x","role":"admin"}"#).unwrap_err();
        assert!(matches!(err, SessionError::Malformed(_)));
    }

    #[test]
    fn graded_teacher_token_is_malformed() {
        let err = SessionContext::from_json(r#"{"username":"t","role":"teacher","grade":"6"}"#)
            .unwrap_err();
        assert!(matches!(err, SessionError::Malformed(_)));
    }

    #[test]
    fn wrong_role_is_rejected() {
        let ctx = SessionContext::new(User::teacher(Username::new("teacher").unwrap()));
        assert_eq!(
            ctx.require(Role::Student).unwrap_err(),
            SessionError::RoleMismatch {
                required: Role::Student,
                actual: Role::Teacher,
            }
        );
        assert!(ctx.require(Role::Teacher).is_ok());
    }
}
