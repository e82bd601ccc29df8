//! Built-in learning content: the subject list, the one available lesson and
//! its quiz.

use serde::Serialize;

use crate::model::LessonId;

/// XP awarded per correctly answered question.
pub const XP_PER_CORRECT_ANSWER: u64 = 10;

/// Id of the only lesson shipped with the app.
pub const CELL_COMPONENTS_LESSON: &str = "components-cell";

//
// ─── SUBJECTS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub name: &'static str,
    pub available: bool,
    pub modules: &'static [Module],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: &'static str,
    pub lessons: &'static [&'static str],
}

pub const SUBJECTS: &[Subject] = &[
    Subject {
        name: "Science",
        available: true,
        modules: &[Module {
            name: "Biology",
            lessons: &[CELL_COMPONENTS_LESSON],
        }],
    },
    Subject {
        name: "Technology",
        available: false,
        modules: &[],
    },
    Subject {
        name: "Engineering",
        available: false,
        modules: &[],
    },
    Subject {
        name: "Mathematics",
        available: false,
        modules: &[],
    },
];

//
// ─── LESSONS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lesson {
    pub id: &'static str,
    pub subject: &'static str,
    pub module: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub quiz: Quiz,
}

static CELL_COMPONENTS: Lesson = Lesson {
    id: CELL_COMPONENTS_LESSON,
    subject: "Science",
    module: "Biology",
    title: "Components of Cell",
    body: "A cell has several important components:
- Nucleus: Controls cell activities and contains DNA.
- Cytoplasm: Jelly-like substance where cell processes happen.
- Cell membrane: Protects the cell and controls what enters/exits.
- Mitochondria: Produces energy for the cell.
- Ribosomes: Make proteins.

Learn these components carefully!",
    quiz: Quiz {
        questions: &[
            Question {
                prompt: "Which cell component contains DNA?",
                options: &["Nucleus", "Mitochondria", "Ribosomes", "Cytoplasm"],
                answer: "Nucleus",
            },
            Question {
                prompt: "What produces energy for the cell?",
                options: &["Cell membrane", "Mitochondria", "Nucleus", "Ribosomes"],
                answer: "Mitochondria",
            },
            Question {
                prompt: "Which part controls what enters and exits the cell?",
                options: &["Cell membrane", "Nucleus", "Cytoplasm", "Ribosomes"],
                answer: "Cell membrane",
            },
        ],
    },
};

static LESSONS: &[&Lesson] = &[&CELL_COMPONENTS];

/// Look up a lesson by id.
#[must_use]
pub fn lesson(id: &LessonId) -> Option<&'static Lesson> {
    LESSONS.iter().copied().find(|l| l.id == id.as_str())
}

/// The lesson offered by default on the dashboard.
#[must_use]
pub fn default_lesson() -> &'static Lesson {
    &CELL_COMPONENTS
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub answer: &'static str,
}

impl Question {
    /// Accepts the option text (case-insensitive) or its 1-based number.
    #[must_use]
    pub fn is_correct(&self, given: &str) -> bool {
        let given = given.trim();
        let chosen = match given.parse::<usize>() {
            Ok(n) if (1..=self.options.len()).contains(&n) => self.options[n - 1],
            _ => given,
        };
        chosen.eq_ignore_ascii_case(self.answer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quiz {
    pub questions: &'static [Question],
}

/// Outcome of grading one quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
    pub earned_xp: u64,
}

impl Quiz {
    /// Grade answers in question order. Missing answers count as wrong and
    /// extra answers are ignored.
    #[must_use]
    pub fn grade<S: AsRef<str>>(&self, answers: &[S]) -> QuizScore {
        let correct = self
            .questions
            .iter()
            .zip(answers)
            .filter(|(q, a)| q.is_correct(a.as_ref()))
            .count();
        QuizScore {
            correct,
            total: self.questions.len(),
            earned_xp: XP_PER_CORRECT_ANSWER * correct as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> Quiz {
        default_lesson().quiz
    }

    #[test]
    fn all_correct_earns_thirty() {
        let score = quiz().grade(&["Nucleus", "Mitochondria", "Cell membrane"]);
        assert_eq!(score.correct, 3);
        assert_eq!(score.total, 3);
        assert_eq!(score.earned_xp, 30);
    }

    #[test]
    fn option_numbers_and_case_are_accepted() {
        let score = quiz().grade(&["1", "mitochondria", "5"]);
        assert_eq!(score.correct, 2);
        assert_eq!(score.earned_xp, 20);
    }

    #[test]
    fn missing_answers_are_wrong() {
        let score = quiz().grade::<&str>(&[]);
        assert_eq!(score.correct, 0);
        assert_eq!(score.earned_xp, 0);
    }

    #[test]
    fn lesson_lookup() {
        let id = LessonId::new(CELL_COMPONENTS_LESSON).unwrap();
        assert_eq!(lesson(&id).map(|l| l.title), Some("Components of Cell"));
        assert!(lesson(&LessonId::new("photosynthesis").unwrap()).is_none());
    }

    #[test]
    fn only_science_is_available() {
        let available: Vec<&str> = SUBJECTS
            .iter()
            .filter(|s| s.available)
            .map(|s| s.name)
            .collect();
        assert_eq!(available, ["Science"]);
    }
}
