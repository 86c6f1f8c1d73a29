//! Error type for `payledger-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] payledger_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A plain insert hit an existing `(emp_id, year, month)`; the batch was
  /// rolled back.
  #[error("duplicate ledger record: {0}")]
  DuplicateRecord(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
