//! First-run demo data.

use quest_core::model::{Progress, User, Username};
use tracing::{debug, info};

use crate::repository::{ProgressRepository, StorageError, UserRepository};

/// How many records a seeding pass actually inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_inserted: usize,
    pub progress_inserted: usize,
}

impl SeedReport {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.users_inserted == 0 && self.progress_inserted == 0
    }
}

fn demo_name(raw: &'static str) -> Result<Username, StorageError> {
    Username::new(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// The three demo accounts: two grade 6 students and one teacher.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if a built-in name fails validation.
pub fn demo_users() -> Result<Vec<User>, StorageError> {
    Ok(vec![
        User::student(demo_name("student1")?, "6"),
        User::student(demo_name("student2")?, "6"),
        User::teacher(demo_name("teacher")?),
    ])
}

/// Zero-XP records for the demo students. Teachers get none.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if a built-in name fails validation.
pub fn demo_progress() -> Result<Vec<Progress>, StorageError> {
    Ok(vec![
        Progress::new(demo_name("student1")?),
        Progress::new(demo_name("student2")?),
    ])
}

/// Insert the demo users and progress into empty collections.
///
/// Each collection is checked separately. Records are inserted with `add`, and
/// a `Conflict` means another seeder got there first, so it is skipped. Running
/// this any number of times leaves the same data as running it once.
///
/// # Errors
///
/// Returns `StorageError` for any failure other than a conflict.
pub async fn seed_defaults(
    users: &dyn UserRepository,
    progress: &dyn ProgressRepository,
) -> Result<SeedReport, StorageError> {
    let mut report = SeedReport::default();

    if users.list_users().await?.is_empty() {
        for user in demo_users()? {
            match users.add_user(&user).await {
                Ok(()) => report.users_inserted += 1,
                Err(StorageError::Conflict) => {
                    debug!(username = %user.username(), "demo user already present");
                }
                Err(e) => return Err(e),
            }
        }
    }

    if progress.list_progress().await?.is_empty() {
        for record in demo_progress()? {
            match progress.add_progress(&record).await {
                Ok(()) => report.progress_inserted += 1,
                Err(StorageError::Conflict) => {
                    debug!(username = %record.username(), "demo progress already present");
                }
                Err(e) => return Err(e),
            }
        }
    }

    if !report.is_noop() {
        info!(
            users = report.users_inserted,
            progress = report.progress_inserted,
            "seeded demo data"
        );
    }
    Ok(report)
}
