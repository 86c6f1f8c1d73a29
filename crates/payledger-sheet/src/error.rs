//! Error types for the spreadsheet boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing required columns: {}", .0.join(", "))]
  MissingColumns(Vec<String>),

  #[error("row {row}, column {column}: {reason} (value {value:?})")]
  InvalidRow {
    /// 1-based spreadsheet row; the header is row 1.
    row:    usize,
    column: String,
    value:  String,
    reason: String,
  },

  #[error("sheet not found: {0}")]
  SheetNotFound(String),

  #[error("workbook contains no sheets")]
  EmptyWorkbook,

  #[error("unsupported file format: {0:?} (expected .xlsx, .xlsm, .xls, .ods or .csv)")]
  UnsupportedFormat(String),

  #[error("workbook error: {0}")]
  Workbook(#[from] calamine::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
