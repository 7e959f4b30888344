//! `calnote`: open or create today's (or a given date's) periodic note.
//!
//! # Responsibility
//! - Wire disk-backed collaborators into the core click router.
//! - Keep settings and logs inside `<vault>/.calnote`.

mod disk;
mod terminal;

use calnote_core::{
    default_log_level, init_logging, ActiveFileStore, CalendarClick, ClickOutcome, ClickRouter,
    ConfigStore, MaterializeOutcome, NoteDefaults, PeriodicDefaults, PersistenceError,
    SqliteSettingsStore,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;
use terminal::DiskHost;

const STATE_DIR: &str = ".calnote";
const SETTINGS_FILE: &str = "settings.sqlite3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NoteKind {
    Day,
    Week,
}

#[derive(Debug, Parser)]
#[command(name = "calnote", version, about = "Open or create a daily or weekly note")]
struct Args {
    #[arg(value_enum, default_value_t = NoteKind::Day)]
    kind: NoteKind,
    /// Vault root directory (defaults to the current directory).
    #[arg(long)]
    vault: Option<PathBuf>,
    /// Date to resolve, `YYYY-MM-DD` (defaults to today).
    #[arg(long)]
    date: Option<String>,
    /// Report the note as opened in a new split.
    #[arg(long)]
    split: bool,
    /// Create missing notes without asking.
    #[arg(long)]
    yes: bool,
    /// Folder for daily notes.
    #[arg(long, default_value = "")]
    daily_folder: String,
    /// Template for daily notes.
    #[arg(long, default_value = "")]
    daily_template: String,
}

#[derive(Debug)]
enum CliError {
    Vault { path: PathBuf, source: std::io::Error },
    Settings(PersistenceError),
    InvalidDate(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vault { path, source } => {
                write!(f, "cannot use vault `{}`: {source}", path.display())
            }
            Self::Settings(err) => write!(f, "cannot open settings: {err}"),
            Self::InvalidDate(value) => write!(f, "invalid date `{value}`; expected YYYY-MM-DD"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Vault { source, .. } => Some(source),
            Self::Settings(err) => Some(err),
            Self::InvalidDate(_) => None,
        }
    }
}

impl From<PersistenceError> for CliError {
    fn from(value: PersistenceError) -> Self {
        Self::Settings(value)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("calnote: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, CliError> {
    let vault_arg = args.vault.clone().unwrap_or_else(|| PathBuf::from("."));
    let root = std::fs::canonicalize(&vault_arg).map_err(|source| CliError::Vault {
        path: vault_arg.clone(),
        source,
    })?;
    let state_dir = root.join(STATE_DIR);
    std::fs::create_dir_all(&state_dir).map_err(|source| CliError::Vault {
        path: state_dir.clone(),
        source,
    })?;

    if let Err(err) = init_logging(default_log_level(), state_dir.join("logs")) {
        eprintln!("calnote: logging disabled: {err}");
    }

    let date = match args.date.as_deref() {
        Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| CliError::InvalidDate(value.to_string()))?,
        None => Local::now().date_naive(),
    };

    let config = ConfigStore::new(SqliteSettingsStore::open(state_dir.join(SETTINGS_FILE))?);
    if let Err(err) = config.hydrate().await {
        warn!(
            "event=settings_hydrate module=cli status=error error={}",
            err
        );
        eprintln!("calnote: using default settings: {err}");
    }

    let defaults = PeriodicDefaults {
        daily: NoteDefaults {
            format: String::new(),
            template: args.daily_template.clone(),
            folder: args.daily_folder.clone(),
        },
        weekly: NoteDefaults::default(),
    };
    let host = DiskHost::new(root, config.get(), defaults, args.yes);
    let active = ActiveFileStore::new();
    let router = ClickRouter::new(&host, &config, &active);

    let click = match args.kind {
        NoteKind::Day => CalendarClick::day(date),
        NoteKind::Week => CalendarClick::week(date),
    };
    let outcome = router.on_period_click(&click, args.split).await;
    config.release();

    let code = match &outcome {
        ClickOutcome::Resolved(MaterializeOutcome::Opened(_))
        | ClickOutcome::Resolved(MaterializeOutcome::Created(_)) => ExitCode::SUCCESS,
        ClickOutcome::Resolved(MaterializeOutcome::Declined) => {
            eprintln!("calnote: not created");
            ExitCode::SUCCESS
        }
        ClickOutcome::Resolved(MaterializeOutcome::Failed(_)) | ClickOutcome::Rejected(_) => {
            ExitCode::FAILURE
        }
    };
    info!(
        "event=cli_exit module=cli status=ok path={}",
        outcome
            .record()
            .map_or_else(|| "-".to_string(), |record| record.file.to_string())
    );
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::{Args, NoteKind};
    use clap::Parser;

    #[test]
    fn parses_week_with_flags() {
        let args = Args::try_parse_from(["calnote", "week", "--date", "2024-03-15", "--yes"])
            .expect("valid args");
        assert_eq!(args.kind, NoteKind::Week);
        assert_eq!(args.date.as_deref(), Some("2024-03-15"));
        assert!(args.yes);
        assert!(!args.split);
    }

    #[test]
    fn kind_defaults_to_day() {
        let args = Args::try_parse_from(["calnote"]).expect("valid args");
        assert_eq!(args.kind, NoteKind::Day);
        assert!(args.vault.is_none());
    }
}
