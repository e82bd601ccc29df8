use std::sync::Arc;

use quest_core::catalog::{self, QuizScore};
use quest_core::leveling::{LevelState, compute_level};
use quest_core::model::{LessonId, Progress, Role};
use quest_core::session::SessionContext;

use crate::error::QuizError;
use crate::progress_service::ProgressService;

/// What the quiz result page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub score: QuizScore,
    pub progress: Progress,
    pub level: LevelState,
}

/// Grades a student's answers and credits the result.
#[derive(Clone)]
pub struct QuizService {
    progress: Arc<ProgressService>,
}

impl QuizService {
    #[must_use]
    pub fn new(progress: Arc<ProgressService>) -> Self {
        Self { progress }
    }

    /// Grade `answers` against the lesson's quiz and record the completion.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` if the session is not a student's,
    /// `QuizError::UnknownLesson` for an id outside the catalog, and
    /// `QuizError::Progress` if the result cannot be saved.
    pub async fn submit<S: AsRef<str>>(
        &self,
        session: &SessionContext,
        lesson_id: &LessonId,
        answers: &[S],
    ) -> Result<QuizOutcome, QuizError> {
        session.require(Role::Student)?;
        let lesson =
            catalog::lesson(lesson_id).ok_or_else(|| QuizError::UnknownLesson(lesson_id.clone()))?;

        let score = lesson.quiz.grade(answers);
        let progress = self
            .progress
            .record_quiz_completion(session.username(), lesson_id.clone(), score.earned_xp)
            .await?;
        let level = compute_level(progress.xp());

        Ok(QuizOutcome {
            score,
            progress,
            level,
        })
    }
}
