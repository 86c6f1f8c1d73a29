//! Subcommand implementations.
//!
//! Spreadsheet parsing is synchronous and runs on the calling task; every
//! store call goes through the async [`LedgerStore`] API.

use std::{
  fs::File,
  io::{self, Write},
  path::Path,
};

use anyhow::{Context, Result};
use payledger_core::{
  backfill::backfill as merge_salaries,
  compare::{employee_comparison, period_comparison},
  record::{ExpenseRecord, ExpenseType, Period},
  report::summarize,
  store::{ImportBatch, ImportStrategy, LedgerStore, PeriodFilter},
};
use payledger_sheet::{Normalized, RowPolicy};
use payledger_store_sqlite::SqliteStore;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::render;

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Hex SHA-256 of the file at `path`.
pub fn file_digest(path: &Path) -> Result<String> {
  let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
  Ok(hex::encode(Sha256::digest(&bytes)))
}

/// A batch carrying the file name and digest of `path` as provenance.
fn batch_from_file(path: &Path, records: Vec<ExpenseRecord>) -> Result<ImportBatch> {
  let mut batch = ImportBatch::new(records).with_digest(file_digest(path)?);
  if let Some(name) = path.file_name() {
    batch = batch.with_source(name.to_string_lossy());
  }
  Ok(batch)
}

fn load(path: &Path, sheet: Option<&str>, policy: RowPolicy) -> Result<Normalized> {
  let normalized = payledger_sheet::load_records(path, sheet, policy)
    .with_context(|| format!("loading {}", path.display()))?;
  for err in &normalized.skipped {
    eprintln!("skipped: {err}");
  }
  Ok(normalized)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

// ─── Import ───────────────────────────────────────────────────────────────────

pub async fn import(
  store: &SqliteStore,
  path: &Path,
  sheet: Option<&str>,
  strategy: ImportStrategy,
  policy: RowPolicy,
) -> Result<()> {
  let normalized = load(path, sheet, policy)?;
  tracing::info!(
    file = %path.display(),
    records = normalized.records.len(),
    %strategy,
    "importing ledger sheet"
  );

  let batch = batch_from_file(path, normalized.records)?;
  let receipt = store.import(batch, strategy).await.context("import failed")?;

  println!(
    "imported {} records ({}, {} skipped) as {}",
    receipt.written,
    receipt.strategy,
    normalized.skipped.len(),
    receipt.import_id,
  );
  Ok(())
}

// ─── Backfill ─────────────────────────────────────────────────────────────────

pub struct BackfillArgs<'a> {
  pub primary:       &'a Path,
  pub primary_sheet: Option<&'a str>,
  pub salary:        &'a Path,
  pub salary_sheet:  Option<&'a str>,
  pub year:          i32,
  pub strategy:      ImportStrategy,
  pub policy:        RowPolicy,
  pub dry_run:       bool,
}

pub async fn backfill(store: &SqliteStore, args: BackfillArgs<'_>) -> Result<()> {
  let normalized = load(args.primary, args.primary_sheet, args.policy)?;
  let salaries = payledger_sheet::load_salary_table(args.salary, args.salary_sheet, args.policy)
    .with_context(|| format!("loading salary sheet {}", args.salary.display()))?;

  let outcome = merge_salaries(normalized.records, &salaries, args.year);
  println!(
    "backfill {}: {} records, {} overwritten, {} synthesized, {} dropped",
    args.year,
    outcome.records.len(),
    outcome.overwritten,
    outcome.synthesized,
    outcome.dropped,
  );
  for (id, month) in &outcome.duplicate_keys {
    eprintln!("duplicate primary row: {id} month {month}");
  }

  if args.dry_run {
    print!("{}", render::summary_table(&summarize(&outcome.records)));
    return Ok(());
  }

  let batch = batch_from_file(args.primary, outcome.records)?;
  let receipt = store
    .import(batch, args.strategy)
    .await
    .context("import of backfilled records failed")?;
  println!("imported {} records as {}", receipt.written, receipt.import_id);
  Ok(())
}

// ─── Reports ──────────────────────────────────────────────────────────────────

pub async fn summary(store: &SqliteStore, filter: PeriodFilter, json: bool) -> Result<()> {
  let rows = store.monthly_summary(filter).await.context("loading summary")?;
  if json {
    print_json(&rows)
  } else {
    print!("{}", render::summary_table(&rows));
    Ok(())
  }
}

pub async fn compare(
  store: &SqliteStore,
  period: Period,
  expense_type: Option<ExpenseType>,
  json: bool,
) -> Result<()> {
  match expense_type {
    Some(expense_type) => {
      let rows = employee_comparison(store, period, expense_type)
        .await
        .context("loading comparison")?;
      if json {
        return print_json(&rows);
      }
      print!("{}", render::employee_changes(period, expense_type, &rows));
    }
    None => {
      let comparison = period_comparison(store, period)
        .await
        .context("loading comparison")?;
      if json {
        return print_json(&comparison);
      }
      print!("{}", render::comparison_table(&comparison));
    }
  }
  Ok(())
}

// ─── Export / history ─────────────────────────────────────────────────────────

pub async fn export(store: &SqliteStore, filter: PeriodFilter, output: Option<&Path>) -> Result<()> {
  let records = store.list_records(filter).await.context("loading records")?;

  match output {
    Some(path) => {
      let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
      payledger_sheet::write_csv(&records, file)?;
      eprintln!("exported {} records to {}", records.len(), path.display());
    }
    None => {
      let stdout = io::stdout();
      let mut lock = stdout.lock();
      payledger_sheet::write_csv(&records, &mut lock)?;
      lock.flush()?;
    }
  }
  Ok(())
}

pub async fn history(store: &SqliteStore, json: bool) -> Result<()> {
  let imports = store.list_imports().await.context("loading import history")?;
  if json {
    print_json(&imports)
  } else {
    print!("{}", render::history_table(&imports));
    Ok(())
  }
}
