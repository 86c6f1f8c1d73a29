//! Spreadsheet boundary for payledger.
//!
//! Reads workbooks (`.xlsx`, `.xlsm`, `.xls`, `.ods`) and CSV files into
//! [`Table`]s, normalizes ledger sheets into
//! [`ExpenseRecord`](payledger_core::record::ExpenseRecord)s, indexes wide
//! salary sheets for backfill and writes the ledger back out as CSV. Pure
//! synchronous; no database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use payledger_sheet::{RowPolicy, load_records};
//!
//! let out = load_records(Path::new("20241125.xlsx"), Some("Sheet1"), RowPolicy::Skip).unwrap();
//! println!("{} records, {} skipped", out.records.len(), out.skipped.len());
//! ```

pub mod error;
pub mod export;
pub mod normalize;
pub mod salary;
pub mod schema;
pub mod table;

use std::path::Path;

pub use error::{Error, Result};
pub use export::write_csv;
pub use normalize::{Normalized, RowPolicy, normalize};
pub use salary::parse_salary_table;
pub use table::{Cell, Table, read_table, sheet_names};

use payledger_core::backfill::SalaryTable;

/// Read and normalize a ledger sheet from `path`.
pub fn load_records(
  path: &Path,
  sheet: Option<&str>,
  policy: RowPolicy,
) -> Result<Normalized> {
  let table = read_table(path, sheet)?;
  normalize(&table, policy)
}

/// Read and index a wide salary sheet from `path`.
pub fn load_salary_table(
  path: &Path,
  sheet: Option<&str>,
  policy: RowPolicy,
) -> Result<SalaryTable> {
  let table = read_table(path, sheet)?;
  parse_salary_table(&table, policy)
}
