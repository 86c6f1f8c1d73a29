//! `payledger`: operator CLI for the payledger expense ledger.
//!
//! # Usage
//!
//! ```text
//! payledger --db ledger.db import 20241125.xlsx --sheet Sheet1
//! payledger backfill 20241125.xlsx --salary salary.xlsx --year 2024
//! payledger summary --year 2024
//! payledger compare 2024 1 --type housing_fund
//! payledger export --output ledger.csv
//! payledger --config ~/.config/payledger/config.toml history
//! ```

mod commands;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use payledger_core::{
  record::{ExpenseType, Period},
  store::{ImportStrategy, PeriodFilter},
};
use payledger_sheet::RowPolicy;
use payledger_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "payledger", about = "Payroll and social-insurance expense ledger")]
struct Args {
  /// Path to a TOML config file (db, strategy, sheet).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// SQLite ledger file (default: payledger.db).
  #[arg(long, env = "PAYLEDGER_DB", value_name = "FILE")]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Normalize a ledger sheet and write it into the store.
  Import {
    file: PathBuf,

    /// Sheet name; the first sheet when omitted.
    #[arg(long)]
    sheet: Option<String>,

    /// replace | upsert | append_only (default: replace).
    #[arg(long)]
    strategy: Option<ImportStrategy>,

    /// Drop unparseable rows instead of failing the whole file.
    #[arg(long)]
    skip_invalid: bool,
  },

  /// Fill missing salaries from a wide salary sheet, then import.
  Backfill {
    /// The primary ledger sheet.
    file: PathBuf,

    /// Wide salary sheet: employee id plus one column per month.
    #[arg(long, value_name = "FILE")]
    salary: PathBuf,

    /// Year the salary sheet covers.
    #[arg(long)]
    year: i32,

    #[arg(long)]
    sheet: Option<String>,

    #[arg(long)]
    salary_sheet: Option<String>,

    #[arg(long)]
    strategy: Option<ImportStrategy>,

    #[arg(long)]
    skip_invalid: bool,

    /// Report what the merge would do without writing.
    #[arg(long)]
    dry_run: bool,
  },

  /// Per-period totals, newest first.
  Summary {
    #[arg(long)]
    year: Option<i32>,

    #[arg(long)]
    month: Option<u32>,

    #[arg(long)]
    json: bool,
  },

  /// Compare a period against the previous calendar month.
  Compare {
    year: i32,

    month: u32,

    /// Restrict to one dimension (salary, housing_fund, ..., total).
    #[arg(long = "type", value_name = "EXPENSE_TYPE")]
    expense_type: Option<ExpenseType>,

    #[arg(long)]
    json: bool,
  },

  /// Write ledger rows as CSV.
  Export {
    #[arg(long)]
    year: Option<i32>,

    #[arg(long)]
    month: Option<u32>,

    /// Output file; stdout when omitted.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
  },

  /// List past imports, newest first.
  History {
    #[arg(long)]
    json: bool,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  db:       String,
  #[serde(default)]
  strategy: String,
  #[serde(default)]
  sheet:    String,
}

/// Effective settings after layering flags over the config file.
#[derive(Debug, PartialEq)]
struct Settings {
  db:       PathBuf,
  strategy: ImportStrategy,
  sheet:    Option<String>,
}

impl Settings {
  /// CLI flags override the config file, which overrides defaults.
  fn resolve(db: Option<PathBuf>, file_cfg: &ConfigFile) -> Result<Self> {
    let strategy = if file_cfg.strategy.is_empty() {
      ImportStrategy::Replace
    } else {
      file_cfg
        .strategy
        .parse::<ImportStrategy>()
        .context("invalid strategy in config file")?
    };

    Ok(Self {
      db: db
        .or_else(|| (!file_cfg.db.is_empty()).then(|| PathBuf::from(&file_cfg.db)))
        .unwrap_or_else(|| PathBuf::from("payledger.db")),
      strategy,
      sheet: (!file_cfg.sheet.is_empty()).then(|| file_cfg.sheet.clone()),
    })
  }
}

fn policy(skip_invalid: bool) -> RowPolicy {
  if skip_invalid { RowPolicy::Skip } else { RowPolicy::Abort }
}

fn filter(year: Option<i32>, month: Option<u32>) -> Result<PeriodFilter> {
  if let Some(month) = month {
    Period::new(year.unwrap_or_default(), month)?;
  }
  Ok(PeriodFilter { year, month })
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };
  let settings = Settings::resolve(args.db, &file_cfg)?;

  let store = SqliteStore::open(&settings.db)
    .await
    .with_context(|| format!("opening ledger {}", settings.db.display()))?;

  match args.command {
    Command::Import { file, sheet, strategy, skip_invalid } => {
      let sheet = sheet.or_else(|| settings.sheet.clone());
      commands::import(
        &store,
        &file,
        sheet.as_deref(),
        strategy.unwrap_or(settings.strategy),
        policy(skip_invalid),
      )
      .await
    }
    Command::Backfill {
      file,
      salary,
      year,
      sheet,
      salary_sheet,
      strategy,
      skip_invalid,
      dry_run,
    } => {
      let sheet = sheet.or_else(|| settings.sheet.clone());
      commands::backfill(&store, commands::BackfillArgs {
        primary: &file,
        primary_sheet: sheet.as_deref(),
        salary: &salary,
        salary_sheet: salary_sheet.as_deref(),
        year,
        strategy: strategy.unwrap_or(settings.strategy),
        policy: policy(skip_invalid),
        dry_run,
      })
      .await
    }
    Command::Summary { year, month, json } => {
      commands::summary(&store, filter(year, month)?, json).await
    }
    Command::Compare { year, month, expense_type, json } => {
      let period = Period::new(year, month)?;
      commands::compare(&store, period, expense_type, json).await
    }
    Command::Export { year, month, output } => {
      commands::export(&store, filter(year, month)?, output.as_deref()).await
    }
    Command::History { json } => commands::history(&store, json).await,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_override_config_file() {
    let file_cfg = ConfigFile {
      db:       "from-file.db".to_owned(),
      strategy: "upsert".to_owned(),
      sheet:    "Sheet1".to_owned(),
    };

    let settings = Settings::resolve(Some(PathBuf::from("flag.db")), &file_cfg).unwrap();
    assert_eq!(settings.db, PathBuf::from("flag.db"));
    assert_eq!(settings.strategy, ImportStrategy::Upsert);
    assert_eq!(settings.sheet.as_deref(), Some("Sheet1"));

    let settings = Settings::resolve(None, &file_cfg).unwrap();
    assert_eq!(settings.db, PathBuf::from("from-file.db"));
  }

  #[test]
  fn defaults_without_config() {
    let settings = Settings::resolve(None, &ConfigFile::default()).unwrap();
    assert_eq!(settings, Settings {
      db:       PathBuf::from("payledger.db"),
      strategy: ImportStrategy::Replace,
      sheet:    None,
    });
  }

  #[test]
  fn config_file_parses() {
    let cfg: ConfigFile = toml::from_str("db = \"x.db\"\nstrategy = \"append-only\"\n").unwrap();
    let settings = Settings::resolve(None, &cfg).unwrap();
    assert_eq!(settings.strategy, ImportStrategy::AppendOnly);
    assert!(Settings::resolve(None, &ConfigFile { strategy: "merge".into(), ..cfg }).is_err());
  }

  #[test]
  fn parses_subcommands() {
    let args = Args::try_parse_from([
      "payledger", "--db", "l.db", "compare", "2024", "1", "--type", "housing_fund",
    ])
    .unwrap();
    match args.command {
      Command::Compare { year, month, expense_type, json } => {
        assert_eq!((year, month), (2024, 1));
        assert_eq!(expense_type, Some(ExpenseType::HousingFund));
        assert!(!json);
      }
      other => panic!("unexpected command: {other:?}"),
    }

    let args = Args::try_parse_from([
      "payledger", "import", "a.xlsx", "--strategy", "append_only", "--skip-invalid",
    ])
    .unwrap();
    assert!(matches!(
      args.command,
      Command::Import { strategy: Some(ImportStrategy::AppendOnly), skip_invalid: true, .. }
    ));
  }

  #[test]
  fn month_filter_is_validated() {
    assert!(filter(None, Some(13)).is_err());
    assert_eq!(filter(Some(2024), None).unwrap(), PeriodFilter { year: Some(2024), month: None });
  }
}
