use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Progress, User, Username};

/// One student's line in the teacher view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    pub username: Username,
    pub grade: Option<String>,
    pub xp: u64,
    pub lessons_completed: usize,
}

/// Join students with their progress and rank them by XP, highest first.
///
/// Students without a progress record get zero XP and zero lessons. Teachers
/// are left out. Ties keep the order in which `users` listed them.
#[must_use]
pub fn build_roster(users: &[User], progress: &[Progress]) -> Vec<RosterRow> {
    let by_name: HashMap<&Username, &Progress> =
        progress.iter().map(|p| (p.username(), p)).collect();

    let mut rows: Vec<RosterRow> = users
        .iter()
        .filter(|u| u.is_student())
        .map(|u| {
            let (xp, lessons_completed) = by_name
                .get(u.username())
                .map_or((0, 0), |p| (p.xp(), p.lessons_completed()));
            RosterRow {
                username: u.username().clone(),
                grade: u.grade().map(str::to_owned),
                xp,
                lessons_completed,
            }
        })
        .collect();

    // sort_by is stable
    rows.sort_by(|a, b| b.xp.cmp(&a.xp));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LessonId;

    fn name(raw: &str) -> Username {
        Username::new(raw).unwrap()
    }

    fn demo_users() -> Vec<User> {
        vec![
            User::student(name("student1"), "6"),
            User::student(name("student2"), "6"),
            User::teacher(name("teacher")),
        ]
    }

    #[test]
    fn missing_progress_defaults_to_zero_and_teacher_is_excluded() {
        let progress = vec![Progress::from_persisted(
            name("student1"),
            40,
            [LessonId::new("a").unwrap()],
        )];

        let rows = build_roster(&demo_users(), &progress);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].username, name("student1"));
        assert_eq!(rows[0].xp, 40);
        assert_eq!(rows[0].lessons_completed, 1);
        assert_eq!(rows[1].username, name("student2"));
        assert_eq!(rows[1].xp, 0);
        assert_eq!(rows[1].lessons_completed, 0);
        assert_eq!(rows[1].grade.as_deref(), Some("6"));
    }

    #[test]
    fn ranks_by_xp_descending() {
        let progress = vec![
            Progress::from_persisted(name("student1"), 10, []),
            Progress::from_persisted(name("student2"), 90, []),
        ];
        let rows = build_roster(&demo_users(), &progress);
        let order: Vec<&str> = rows.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(order, ["student2", "student1"]);
    }

    #[test]
    fn ties_keep_listing_order() {
        let users = vec![
            User::student(name("zoe"), "7"),
            User::student(name("adam"), "7"),
            User::student(name("mia"), "7"),
        ];
        let progress = vec![
            Progress::from_persisted(name("adam"), 20, []),
            Progress::from_persisted(name("zoe"), 20, []),
        ];
        let rows = build_roster(&users, &progress);
        let order: Vec<&str> = rows.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(order, ["zoe", "adam", "mia"]);
    }

    #[test]
    fn orphan_progress_is_ignored() {
        let progress = vec![Progress::from_persisted(name("ghost"), 500, [])];
        let rows = build_roster(&demo_users(), &progress);
        assert!(rows.iter().all(|r| r.xp == 0));
    }
}
