use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::Username;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("only students carry a grade")]
    GradeOnTeacher,
}

//
// ─── ROLE ──────────────────────────────────────────────────────────────────────
//

/// What a logged-in user is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    /// Storage and wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(UserError::UnknownRole(other.to_owned())),
        }
    }
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// A user record. Created once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord")]
pub struct User {
    username: Username,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    grade: Option<String>,
}

/// Wire shape of `User`, checked by `User::new` before use.
#[derive(Deserialize)]
struct UserRecord {
    username: Username,
    role: Role,
    #[serde(default)]
    grade: Option<String>,
}

impl TryFrom<UserRecord> for User {
    type Error = UserError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        User::new(record.username, record.role, record.grade)
    }
}

impl User {
    /// Builds a user, checking that the grade is only set for students.
    ///
    /// # Errors
    ///
    /// Returns `UserError::GradeOnTeacher` if a teacher is given a grade.
    pub fn new(username: Username, role: Role, grade: Option<String>) -> Result<Self, UserError> {
        if role == Role::Teacher && grade.is_some() {
            return Err(UserError::GradeOnTeacher);
        }
        Ok(Self {
            username,
            role,
            grade,
        })
    }

    #[must_use]
    pub fn student(username: Username, grade: impl Into<String>) -> Self {
        Self {
            username,
            role: Role::Student,
            grade: Some(grade.into()),
        }
    }

    #[must_use]
    pub fn teacher(username: Username) -> Self {
        Self {
            username,
            role: Role::Teacher,
            grade: None,
        }
    }

    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn grade(&self) -> Option<&str> {
        self.grade.as_deref()
    }

    #[must_use]
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}
