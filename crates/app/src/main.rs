use std::fmt;
use std::path::PathBuf;

use services::{AppServices, Clock};
use services::app_services::load_catalog;
use trivia_core::model::SessionMode;

mod config;
mod quiz;

use config::{ConfigError, Settings, parse_player};

const DEFAULT_HISTORY_LIMIT: u32 = 10;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidLimit { raw: String },
    Config(ConfigError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
            ArgsError::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  diamond-quiz [play]  [--data-only] [common options]");
    eprintln!("  diamond-quiz daily   [common options]");
    eprintln!("  diamond-quiz stats   [common options]");
    eprintln!("  diamond-quiz history [--limit <n>] [common options]");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --db <sqlite_url>    default sqlite://diamond-quiz.sqlite3");
    eprintln!("  --catalog <path>     JSON question catalog, default built-in");
    eprintln!("  --player <id>        default local");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DIAMOND_QUIZ_CONFIG, DIAMOND_QUIZ_DB_URL, DIAMOND_QUIZ_CATALOG,");
    eprintln!("  DIAMOND_QUIZ_PLAYER, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Daily,
    Stats,
    History,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "daily" => Some(Self::Daily),
            "stats" => Some(Self::Stats),
            "history" => Some(Self::History),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    settings: Settings,
    history_limit: u32,
}

impl Args {
    /// Apply command-line flags on top of `settings`.
    fn parse(
        mut settings: Settings,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut history_limit = DEFAULT_HISTORY_LIMIT;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    settings.db_url = value;
                }
                "--catalog" => {
                    settings.catalog = Some(PathBuf::from(require_value(args, "--catalog")?));
                }
                "--player" => {
                    let value = require_value(args, "--player")?;
                    settings.player = parse_player(value).map_err(ArgsError::Config)?;
                }
                "--data-only" => settings.data_only = true,
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    history_limit = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ArgsError::InvalidLimit { raw: value })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        settings.db_url = normalize_sqlite_url(settings.db_url);
        Ok(Self {
            settings,
            history_limit,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
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

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means play.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let settings = Settings::load()?;
    let parsed = Args::parse(settings, &mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let settings = parsed.settings;
    tracing::debug!(?cmd, db = %settings.db_url, player = %settings.player, "starting");

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&settings.db_url)?;
    let catalog = load_catalog(settings.catalog.as_deref())?;
    let services =
        AppServices::new_sqlite(&settings.db_url, Clock::default_clock(), catalog).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cmd {
        Command::Play | Command::Daily => {
            let mode = match cmd {
                Command::Daily => SessionMode::Daily,
                _ if settings.data_only => SessionMode::DataOnly,
                _ => SessionMode::Standard,
            };
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            quiz::play(
                &services.session_loop(),
                &settings.player,
                mode,
                &mut input,
                &mut out,
            )
            .await
        }
        Command::Stats => {
            quiz::print_stats(&services.stats(), &services.catalog(), &mut out).await
        }
        Command::History => {
            quiz::print_history(
                &services.history(),
                &settings.player,
                parsed.history_limit,
                &mut out,
            )
            .await
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_string());
        Args::parse(Settings::default(), &mut iter)
    }

    #[test]
    fn flags_override_settings() {
        let args = parse(&[
            "--db",
            "sqlite::memory:",
            "--player",
            "casey",
            "--catalog",
            "questions.json",
            "--data-only",
        ])
        .unwrap();
        assert_eq!(args.settings.db_url, "sqlite::memory:");
        assert_eq!(args.settings.player.as_str(), "casey");
        assert_eq!(args.settings.catalog, Some(PathBuf::from("questions.json")));
        assert!(args.settings.data_only);
        assert_eq!(args.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn defaults_apply_without_flags() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.settings.db_url, config::DEFAULT_DB_URL);
        assert_eq!(args.settings.player.as_str(), config::DEFAULT_PLAYER);
        assert!(!args.settings.data_only);
    }

    #[test]
    fn relative_paths_are_normalized() {
        let url = normalize_sqlite_url("sqlite:data/quiz.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.db"));
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/q.db".into()),
            "sqlite:///tmp/q.db"
        );
    }

    #[test]
    fn bad_flags_are_rejected() {
        assert!(matches!(
            parse(&["--db"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--db" }
        ));
        assert!(matches!(
            parse(&["--limit", "0"]).unwrap_err(),
            ArgsError::InvalidLimit { .. }
        ));
        assert!(matches!(
            parse(&["--player", " "]).unwrap_err(),
            ArgsError::Config(ConfigError::InvalidPlayer { .. })
        ));
        assert!(matches!(
            parse(&["--verbose"]).unwrap_err(),
            ArgsError::UnknownArg(_)
        ));
    }

    #[test]
    fn subcommands_are_recognized() {
        assert_eq!(Command::from_arg("daily"), Some(Command::Daily));
        assert_eq!(Command::from_arg("history"), Some(Command::History));
        assert_eq!(Command::from_arg("seed"), None);
    }
}
