use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identity key of a user; also the key of that user's progress record.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Creates a `Username`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the trimmed value is empty.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ParseIdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ParseIdError::new("Username"));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a lesson, e.g. `components-cell`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LessonId(String);

impl LessonId {
    /// Creates a `LessonId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the trimmed value is empty.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ParseIdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ParseIdError::new("LessonId"));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Username({})", self.0)
    }
}

impl fmt::Debug for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LessonId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Conversions ───────────────────────────────────────────────────────────────

/// Error type for parsing an identifier from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl ParseIdError {
    fn new(kind: &'static str) -> Self {
        Self { kind }
    }
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cannot be empty", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for Username {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for LessonId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Username {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for LessonId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl From<LessonId> for String {
    fn from(value: LessonId) -> Self {
        value.0
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed() {
        let name = Username::new("  student1 ").unwrap();
        assert_eq!(name.as_str(), "student1");
        assert_eq!(name.to_string(), "student1");
    }

    #[test]
    fn blank_username_is_rejected() {
        assert!(Username::new("   ").is_err());
        assert!("".parse::<Username>().is_err());
    }

    #[test]
    fn lesson_id_from_str() {
        let id: LessonId = "components-cell".parse().unwrap();
        assert_eq!(id.as_str(), "components-cell");
    }

    #[test]
    fn deserializing_blank_lesson_id_fails() {
        let result = serde_json::from_str::<LessonId>("\"  \"");
        assert!(result.is_err());
    }
}
