use quest_core::build_roster;
use quest_core::model::{LessonId, Progress, User, Username};
use storage::repository::{ProgressRepository, Storage, StorageError, UserRepository};
use storage::seed::seed_defaults;
use storage::sqlite::{SCHEMA_VERSION, SqliteRepository};

fn name(raw: &str) -> Username {
    Username::new(raw).unwrap()
}

async fn open(url: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_users_and_progress() {
    let repo = open("sqlite:file:memdb_roundtrip?mode=memory&cache=shared").await;

    let student = User::student(name("student1"), "6");
    let teacher = User::teacher(name("teacher"));
    repo.put_user(&student).await.unwrap();
    repo.put_user(&teacher).await.unwrap();
    assert_eq!(repo.get_user(&name("student1")).await.unwrap(), Some(student));
    assert_eq!(repo.get_user(&name("teacher")).await.unwrap(), Some(teacher));

    let progress = Progress::from_persisted(
        name("student1"),
        60,
        [
            LessonId::new("components-cell").unwrap(),
            LessonId::new("photosynthesis").unwrap(),
        ],
    );
    repo.put_progress(&progress).await.unwrap();
    assert_eq!(
        repo.get_progress(&name("student1")).await.unwrap(),
        Some(progress)
    );
    assert!(repo.get_progress(&name("student2")).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_add_conflicts_and_put_overwrites() {
    let repo = open("sqlite:file:memdb_conflict?mode=memory&cache=shared").await;

    repo.add_progress(&Progress::new(name("student1"))).await.unwrap();
    let err = repo
        .add_progress(&Progress::from_persisted(name("student1"), 99, []))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
    assert_eq!(
        repo.get_progress(&name("student1")).await.unwrap().unwrap().xp(),
        0
    );

    repo.put_progress(&Progress::from_persisted(name("student1"), 99, []))
        .await
        .unwrap();
    let all = repo.list_progress().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].xp(), 99);
}

#[tokio::test]
async fn sqlite_lists_by_username_like_in_memory() {
    let repo = open("sqlite:file:memdb_order?mode=memory&cache=shared").await;
    let memory = Storage::in_memory();
    for raw in ["zoe", "adam", "mia"] {
        let user = User::student(name(raw), "7");
        repo.add_user(&user).await.unwrap();
        memory.users.add_user(&user).await.unwrap();
        let progress = Progress::from_persisted(name(raw), 20, []);
        repo.add_progress(&progress).await.unwrap();
        memory.progress.add_progress(&progress).await.unwrap();
    }

    let names = |users: Vec<User>| -> Vec<String> {
        users.into_iter().map(|u| u.username().to_string()).collect()
    };
    let from_sqlite = names(repo.list_users().await.unwrap());
    assert_eq!(from_sqlite, ["adam", "mia", "zoe"]);
    assert_eq!(from_sqlite, names(memory.users.list_users().await.unwrap()));

    // equal XP, so the roster keeps listing order on both backends
    let sqlite_roster = build_roster(
        &repo.list_users().await.unwrap(),
        &repo.list_progress().await.unwrap(),
    );
    let memory_roster = build_roster(
        &memory.users.list_users().await.unwrap(),
        &memory.progress.list_progress().await.unwrap(),
    );
    assert_eq!(sqlite_roster, memory_roster);
}

#[tokio::test]
async fn sqlite_migration_is_idempotent() {
    let repo = open("sqlite:file:memdb_migrate?mode=memory&cache=shared").await;
    repo.put_user(&User::teacher(name("teacher"))).await.unwrap();

    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.schema_version().await.unwrap(), Some(SCHEMA_VERSION));
    assert_eq!(repo.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_seeding_is_idempotent() {
    let storage = Storage::sqlite("sqlite:file:memdb_seed?mode=memory&cache=shared")
        .await
        .expect("open");

    seed_defaults(storage.users.as_ref(), storage.progress.as_ref())
        .await
        .unwrap();
    let again = seed_defaults(storage.users.as_ref(), storage.progress.as_ref())
        .await
        .unwrap();

    assert!(again.is_noop());
    assert_eq!(storage.users.list_users().await.unwrap().len(), 3);
    assert_eq!(storage.progress.list_progress().await.unwrap().len(), 2);
}

#[tokio::test]
async fn sqlite_file_reopens_with_same_data() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("eduquest.sqlite3").display()
    );

    {
        let storage = Storage::sqlite(&url).await.expect("first open");
        storage
            .progress
            .put_progress(&Progress::from_persisted(name("student1"), 40, []))
            .await
            .unwrap();
    }

    let reopened = Storage::sqlite(&url).await.expect("second open");
    let progress = reopened
        .progress
        .get_progress(&name("student1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.xp(), 40);
}
