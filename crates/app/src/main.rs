mod args;
mod views;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quest_core::catalog;
use quest_core::SessionError;
use quest_core::model::{LessonId, Role};
use services::{AppServices, RedirectReason, ViewAccess};
use storage::session_store::FileSessionStore;

use crate::args::{Args, ArgsError, Command, print_usage};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_lesson(raw: &str) -> Result<LessonId, quest_core::Error> {
    Ok(LessonId::new(raw)?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::from_env().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    init_tracing();

    // sqlite will not create a missing file on its own
    if let Err(err) = prepare_sqlite_file(&parsed.db_url) {
        warn!(db_url = %parsed.db_url, error = %err, "could not prepare database file");
    }
    let session_store = Arc::new(FileSessionStore::new(parsed.session_path.clone()));
    let app = AppServices::new_sqlite_or_unavailable(&parsed.db_url, session_store).await;
    let sessions = app.sessions();

    match parsed.command {
        Command::Login { username } => match sessions.login(&username).await {
            Ok(ctx) => {
                println!("Logged in as {} ({}).", ctx.username(), ctx.role());
                Ok(())
            }
            Err(err) => Err(err.user_message().into()),
        },
        Command::Logout => {
            sessions.logout().await.map_err(|e| e.user_message())?;
            println!("Logged out.");
            Ok(())
        }
        Command::Dashboard => {
            let ctx = match sessions.current().await {
                Ok(ctx) => ctx,
                Err(SessionError::Malformed(_)) => {
                    return Err(views::redirect(RedirectReason::MalformedSession).into());
                }
                Err(_) => return Err(views::redirect(RedirectReason::InvalidSession).into()),
            };
            match ctx.role() {
                Role::Student => {
                    let summary = app.progress().summary(ctx.username()).await;
                    print!("{}", views::student_dashboard(&summary, ctx.user().grade()));
                }
                Role::Teacher => {
                    println!("Welcome, {}!\n", ctx.username());
                    print!("{}", views::roster(&app.roster().build_roster().await));
                }
            }
            Ok(())
        }
        Command::Lesson { lesson } => {
            if let ViewAccess::RedirectToLogin(reason) = sessions.require(Role::Student).await {
                return Err(views::redirect(reason).into());
            }
            let lesson = match lesson {
                Some(raw) => {
                    let id = parse_lesson(&raw)?;
                    catalog::lesson(&id).ok_or_else(|| format!("no lesson named {id}"))?
                }
                None => catalog::default_lesson(),
            };
            print!("{}", views::lesson(lesson));
            Ok(())
        }
        Command::Quiz { lesson, answers } => {
            let ctx = match sessions.require(Role::Student).await {
                ViewAccess::Granted(ctx) => ctx,
                ViewAccess::RedirectToLogin(reason) => {
                    return Err(views::redirect(reason).into());
                }
            };
            let id = parse_lesson(&lesson)?;
            let outcome = app
                .quiz()
                .submit(&ctx, &id, &answers)
                .await
                .map_err(|e| e.user_message())?;
            print!("{}", views::quiz_result(&outcome));
            Ok(())
        }
        Command::Roster => {
            if let ViewAccess::RedirectToLogin(reason) = sessions.require(Role::Teacher).await {
                return Err(views::redirect(reason).into());
            }
            print!("{}", views::roster(&app.roster().build_roster().await));
            Ok(())
        }
        Command::Seed => {
            let report = app.seed().await?;
            info!(
                users = report.users_inserted,
                progress = report.progress_inserted,
                "seed finished"
            );
            if report.is_noop() {
                println!("Demo data already present.");
            } else {
                println!(
                    "Seeded {} users and {} progress records.",
                    report.users_inserted, report.progress_inserted
                );
            }
            Ok(())
        }
        Command::Help => Ok(()),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
