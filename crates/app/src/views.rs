//! Plain-text renderings of the student and teacher pages.

use std::fmt::Write as _;

use quest_core::catalog::{Lesson, SUBJECTS, default_lesson};
use quest_core::roster::RosterRow;
use services::{QuizOutcome, RedirectReason, StudentSummary};

const BAR_WIDTH: usize = 20;

pub fn redirect(reason: RedirectReason) -> String {
    match reason {
        RedirectReason::InvalidSession => {
            "Please log in first: eduquest login <username>".to_owned()
        }
        RedirectReason::MalformedSession => {
            "Your session could not be read. Please log in again.".to_owned()
        }
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {percent}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

//
// ─── STUDENT ───────────────────────────────────────────────────────────────────
//

pub fn student_dashboard(summary: &StudentSummary, grade: Option<&str>) -> String {
    let mut out = String::new();
    let progress = &summary.progress;
    let level = &summary.level;

    let _ = writeln!(out, "Welcome, {}!", progress.username());
    if let Some(grade) = grade {
        let _ = writeln!(out, "Grade {grade}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Level {}", level.level);
    let _ = writeln!(
        out,
        "XP {} / {}  {}",
        level.xp_into_level,
        level.xp_to_next_level,
        progress_bar(level.percent())
    );
    let _ = writeln!(out, "Total XP: {}", progress.xp());
    let _ = writeln!(out, "Lessons completed: {}", progress.lessons_completed());
    for lesson in progress.completed_lessons() {
        let _ = writeln!(out, "  - {lesson}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Subjects:");
    for subject in SUBJECTS {
        if subject.available {
            let _ = writeln!(out, "  {}", subject.name);
            for module in subject.modules {
                let _ = writeln!(out, "    {}: {}", module.name, module.lessons.join(", "));
            }
        } else {
            let _ = writeln!(out, "  {} (coming soon)", subject.name);
        }
    }
    let _ = writeln!(
        out,
        "\nNext: eduquest lesson {}",
        default_lesson().id
    );
    out
}

pub fn lesson(lesson: &Lesson) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} > {}", lesson.subject, lesson.module);
    let _ = writeln!(out, "{}", lesson.title);
    let _ = writeln!(out, "{}", "=".repeat(lesson.title.len()));
    let _ = writeln!(out, "{}", lesson.body);
    let _ = writeln!(out);
    let _ = writeln!(out, "Quiz:");
    for (n, question) in lesson.quiz.questions.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", n + 1, question.prompt);
        for (i, option) in question.options.iter().enumerate() {
            let _ = writeln!(out, "   {}) {option}", i + 1);
        }
    }
    let _ = writeln!(
        out,
        "\nAnswer with: eduquest quiz {} <answer>...",
        lesson.id
    );
    out
}

pub fn quiz_result(outcome: &QuizOutcome) -> String {
    let mut out = String::new();
    let score = &outcome.score;
    let _ = writeln!(
        out,
        "You got {} / {} correct and earned {} XP.",
        score.correct, score.total, score.earned_xp
    );
    let _ = writeln!(
        out,
        "Level {}  {}",
        outcome.level.level,
        progress_bar(outcome.level.percent())
    );
    let _ = writeln!(out, "Total XP: {}", outcome.progress.xp());
    out
}

//
// ─── TEACHER ───────────────────────────────────────────────────────────────────
//

pub fn roster(rows: &[RosterRow]) -> String {
    if rows.is_empty() {
        return "No students yet.\n".to_owned();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<16} {:<6} {:>6} {:>8}",
        "#", "Student", "Grade", "XP", "Lessons"
    );
    for (rank, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<16} {:<6} {:>6} {:>8}",
            rank + 1,
            row.username.as_str(),
            row.grade.as_deref().unwrap_or("-"),
            row.xp,
            row.lessons_completed
        );
    }
    out
}
