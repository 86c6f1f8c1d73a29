//! The `LedgerStore` trait and supporting import/query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `payledger-store-sqlite`). The API and CLI depend on this abstraction, not
//! on any concrete backend.

use std::{fmt, future::Future, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error,
  record::{ExpenseRecord, Period},
  report::PeriodSummary,
};

// ─── Import strategies ───────────────────────────────────────────────────────

/// How a batch is written into the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStrategy {
  /// Clear the whole ledger, then insert the batch (full reload).
  Replace,
  /// Insert or replace per `(employee_id, year, month)`; nothing is cleared.
  Upsert,
  /// Plain insert. An existing key makes the whole batch fail.
  AppendOnly,
}

impl ImportStrategy {
  pub fn as_str(self) -> &'static str {
    match self {
      ImportStrategy::Replace => "replace",
      ImportStrategy::Upsert => "upsert",
      ImportStrategy::AppendOnly => "append_only",
    }
  }
}

impl fmt::Display for ImportStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ImportStrategy {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "replace" => Ok(ImportStrategy::Replace),
      "upsert" => Ok(ImportStrategy::Upsert),
      "append_only" | "append-only" => Ok(ImportStrategy::AppendOnly),
      other => Err(Error::UnknownStrategy(other.to_owned())),
    }
  }
}

// ─── Batches and receipts ────────────────────────────────────────────────────

/// A set of records written in one transaction, with optional provenance.
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
  pub records: Vec<ExpenseRecord>,
  /// Human-readable origin, typically the spreadsheet file name.
  pub source:  Option<String>,
  /// Hex SHA-256 of the source file, when the caller computed one.
  pub digest:  Option<String>,
}

impl ImportBatch {
  pub fn new(records: Vec<ExpenseRecord>) -> Self {
    Self { records, source: None, digest: None }
  }

  pub fn with_source(mut self, source: impl Into<String>) -> Self {
    self.source = Some(source.into());
    self
  }

  pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
    self.digest = Some(digest.into());
    self
  }
}

/// The audit entry a store records for every committed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReceipt {
  pub import_id:   Uuid,
  pub strategy:    ImportStrategy,
  pub source:      Option<String>,
  pub digest:      Option<String>,
  /// Rows written by this batch.
  pub written:     usize,
  pub imported_at: DateTime<Utc>,
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Optional restriction on the periods a read covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFilter {
  pub year:  Option<i32>,
  pub month: Option<u32>,
}

impl PeriodFilter {
  pub fn matches(&self, period: Period) -> bool {
    self.year.is_none_or(|y| y == period.year)
      && self.month.is_none_or(|m| m == period.month)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a ledger backend.
///
/// Every `import` is atomic: either the whole batch (and its receipt) is
/// committed or nothing is. Reads never observe a half-written batch.
pub trait LedgerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Write `batch` using `strategy` inside a single transaction.
  fn import(
    &self,
    batch: ImportBatch,
    strategy: ImportStrategy,
  ) -> impl Future<Output = Result<ImportReceipt, Self::Error>> + Send + '_;

  /// All records of one period, ordered by employee id.
  fn records_for_period(
    &self,
    period: Period,
  ) -> impl Future<Output = Result<Vec<ExpenseRecord>, Self::Error>> + Send + '_;

  /// Records matching `filter`, ordered by period then employee id.
  fn list_records(
    &self,
    filter: PeriodFilter,
  ) -> impl Future<Output = Result<Vec<ExpenseRecord>, Self::Error>> + Send + '_;

  /// Per-period sums, newest period first. Periods without records are
  /// absent.
  fn monthly_summary(
    &self,
    filter: PeriodFilter,
  ) -> impl Future<Output = Result<Vec<PeriodSummary>, Self::Error>> + Send + '_;

  /// Number of ledger rows.
  fn count(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Import history, newest first.
  fn list_imports(
    &self,
  ) -> impl Future<Output = Result<Vec<ImportReceipt>, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strategy_round_trips_through_text() {
    for s in [ImportStrategy::Replace, ImportStrategy::Upsert, ImportStrategy::AppendOnly] {
      assert_eq!(s.as_str().parse::<ImportStrategy>().unwrap(), s);
    }
    assert_eq!("append-only".parse::<ImportStrategy>().unwrap(), ImportStrategy::AppendOnly);
    assert!("merge".parse::<ImportStrategy>().is_err());
  }

  #[test]
  fn filter_matches_optional_fields() {
    let p = Period { year: 2024, month: 3 };
    assert!(PeriodFilter::default().matches(p));
    assert!(PeriodFilter { year: Some(2024), month: None }.matches(p));
    assert!(!PeriodFilter { year: Some(2024), month: Some(4) }.matches(p));
  }
}
