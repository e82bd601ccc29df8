use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::ids::{LessonId, Username};

/// A student's cumulative XP and the set of lessons they have completed.
///
/// One record per user, keyed by `username`. XP never decreases and the lesson
/// set never holds duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    username: Username,
    xp: u64,
    completed_lessons: BTreeSet<LessonId>,
}

impl Progress {
    /// The default record for a user with no stored progress.
    #[must_use]
    pub fn new(username: Username) -> Self {
        Self {
            username,
            xp: 0,
            completed_lessons: BTreeSet::new(),
        }
    }

    /// Rebuild a record from persisted fields.
    #[must_use]
    pub fn from_persisted(
        username: Username,
        xp: u64,
        completed_lessons: impl IntoIterator<Item = LessonId>,
    ) -> Self {
        Self {
            username,
            xp,
            completed_lessons: completed_lessons.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    #[must_use]
    pub fn xp(&self) -> u64 {
        self.xp
    }

    #[must_use]
    pub fn completed_lessons(&self) -> &BTreeSet<LessonId> {
        &self.completed_lessons
    }

    #[must_use]
    pub fn lessons_completed(&self) -> usize {
        self.completed_lessons.len()
    }

    #[must_use]
    pub fn has_completed(&self, lesson: &LessonId) -> bool {
        self.completed_lessons.contains(lesson)
    }

    /// Credit a finished quiz.
    ///
    /// XP is added on every completion, retakes included; the lesson is only
    /// recorded once. Returns `true` if the lesson was not completed before.
    pub fn apply_quiz_completion(&mut self, lesson: LessonId, earned_xp: u64) -> bool {
        self.xp = self.xp.saturating_add(earned_xp);
        self.completed_lessons.insert(lesson)
    }
}
