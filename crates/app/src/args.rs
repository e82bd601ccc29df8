use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_DB: &str = "eduquest.sqlite3";
pub const DEFAULT_SESSION_FILE: &str = ".eduquest-session.json";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, what } => {
                write!(f, "{command} requires {what}")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String },
    Logout,
    Dashboard,
    Lesson { lesson: Option<String> },
    Quiz { lesson: String, answers: Vec<String> },
    Roster,
    Seed,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub db_url: String,
    pub session_path: PathBuf,
    pub command: Command,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    /// Parse process arguments, with `EDUQUEST_*` variables as fallbacks.
    pub fn from_env() -> Result<Self, ArgsError> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// `env` looks up configuration variables; flags override them.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("EDUQUEST_DB_URL").map_or_else(
            || normalize_sqlite_url(DEFAULT_DB.to_owned()),
            normalize_sqlite_url,
        );
        let mut session_path = env("EDUQUEST_SESSION_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        let mut positional = Vec::new();
        let mut args = argv.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--session" => {
                    session_path = PathBuf::from(require_value(&mut args, "--session")?);
                }
                "--help" | "-h" => positional.insert(0, "help".to_owned()),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let command = Self::command(positional)?;
        Ok(Self {
            db_url,
            session_path,
            command,
        })
    }

    fn command(positional: Vec<String>) -> Result<Command, ArgsError> {
        let mut rest = positional.into_iter();
        let Some(name) = rest.next() else {
            return Ok(Command::Dashboard);
        };

        let command = match name.as_str() {
            "login" => Command::Login {
                username: rest.next().ok_or(ArgsError::MissingArgument {
                    command: "login",
                    what: "a username",
                })?,
            },
            "logout" => Command::Logout,
            "dashboard" => Command::Dashboard,
            "lesson" => Command::Lesson { lesson: rest.next() },
            "quiz" => Command::Quiz {
                lesson: rest.next().ok_or(ArgsError::MissingArgument {
                    command: "quiz",
                    what: "a lesson id",
                })?,
                answers: rest.by_ref().collect(),
            },
            "roster" => Command::Roster,
            "seed" => Command::Seed,
            "help" => Command::Help,
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        if let Some(extra) = rest.next() {
            return Err(ArgsError::UnknownArg(extra));
        }
        Ok(command)
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  eduquest [--db <sqlite_url>] [--session <path>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  login <username>               Start a session (student1, student2, teacher)");
    eprintln!("  logout                         End the session");
    eprintln!("  dashboard                      Student progress or teacher roster (default)");
    eprintln!("  lesson [lesson-id]             Read a lesson");
    eprintln!("  quiz <lesson-id> <answer>...   Answer a quiz by option text or number");
    eprintln!("  roster                         Ranked student progress (teacher)");
    eprintln!("  seed                           Insert demo data into an empty database");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://<cwd>/{DEFAULT_DB}");
    eprintln!("  --session {DEFAULT_SESSION_FILE}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EDUQUEST_DB_URL, EDUQUEST_SESSION_FILE, RUST_LOG");
}

/// Resolve `--db` to a URL sqlx can open.
///
/// In-memory and `sqlite:file:` URIs pass through untouched; a bare path or
/// `sqlite:<path>` becomes an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: String) -> String {
    let raw = raw.trim();
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:")
    {
        return raw.to_owned();
    }

    let path = PathBuf::from(raw.strip_prefix("sqlite:").unwrap_or(raw));
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(argv.iter().map(|s| (*s).to_owned()), |_| None)
    }

    #[test]
    fn no_command_opens_dashboard() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.command, Command::Dashboard);
        assert!(args.db_url.starts_with("sqlite://"));
        assert!(args.db_url.ends_with(DEFAULT_DB));
        assert_eq!(args.session_path, PathBuf::from(DEFAULT_SESSION_FILE));
    }

    #[test]
    fn quiz_collects_answers_around_flags() {
        let args = parse(&[
            "quiz",
            "components-cell",
            "1",
            "--db",
            "sqlite::memory:",
            "Mitochondria",
        ])
        .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(
            args.command,
            Command::Quiz {
                lesson: "components-cell".into(),
                answers: vec!["1".into(), "Mitochondria".into()],
            }
        );
    }

    #[test]
    fn environment_is_overridden_by_flags() {
        let env = |key: &str| match key {
            "EDUQUEST_DB_URL" => Some("sqlite:///tmp/env.sqlite3".to_owned()),
            "EDUQUEST_SESSION_FILE" => Some("/tmp/env-session.json".to_owned()),
            _ => None,
        };
        let args = Args::parse(
            ["roster", "--session", "/tmp/flag.json"].map(str::to_owned),
            env,
        )
        .unwrap();
        assert_eq!(args.db_url, "sqlite:///tmp/env.sqlite3");
        assert_eq!(args.session_path, PathBuf::from("/tmp/flag.json"));
    }

    #[test]
    fn login_needs_a_username() {
        assert!(matches!(
            parse(&["login"]),
            Err(ArgsError::MissingArgument { command: "login", .. })
        ));
    }

    #[test]
    fn stray_arguments_are_rejected() {
        assert!(matches!(parse(&["logout", "now"]), Err(ArgsError::UnknownArg(_))));
        assert!(matches!(parse(&["fly"]), Err(ArgsError::UnknownCommand(_))));
        assert!(matches!(parse(&["--verbose"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn shared_memory_uris_are_kept() {
        let uri = "sqlite:file:memdb_cli?mode=memory&cache=shared";
        assert_eq!(normalize_sqlite_url(uri.to_owned()), uri);

        let args = parse(&["--db", uri, "roster"]).unwrap();
        assert_eq!(args.db_url, uri);
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/eduquest.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/eduquest.sqlite3"));
    }
}
