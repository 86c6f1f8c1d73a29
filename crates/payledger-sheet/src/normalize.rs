//! Ledger sheet rows → [`ExpenseRecord`]s.

use payledger_core::record::{Amounts, EmployeeId, ExpenseRecord, Period};

use crate::{
  Error, Result,
  schema::{ColumnMap, ColumnRole},
  table::{Cell, Table},
};

/// What to do with a row that cannot be normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
  /// The first invalid row fails the whole table.
  #[default]
  Abort,
  /// Invalid rows are dropped and reported in [`Normalized::skipped`].
  Skip,
}

/// Records read from a table plus the rows that were skipped.
#[derive(Debug, Default)]
pub struct Normalized {
  pub records: Vec<ExpenseRecord>,
  /// Always [`Error::InvalidRow`]; empty under [`RowPolicy::Abort`].
  pub skipped: Vec<Error>,
}

/// Turn every non-blank row of `table` into an [`ExpenseRecord`].
pub fn normalize(table: &Table, policy: RowPolicy) -> Result<Normalized> {
  let columns = ColumnMap::resolve(&table.headers, &ColumnRole::LEDGER)?;
  let mut out = Normalized::default();

  for row in 0..table.rows.len() {
    match normalize_row(table, &columns, row) {
      Ok(Some(record)) => out.records.push(record),
      Ok(None) => {}
      Err(err) if policy == RowPolicy::Skip => {
        tracing::warn!(%err, "skipping invalid row");
        out.skipped.push(err);
      }
      Err(err) => return Err(err),
    }
  }

  tracing::debug!(
    records = out.records.len(),
    skipped = out.skipped.len(),
    "normalized ledger table"
  );
  Ok(out)
}

/// `Ok(None)` for a fully blank row.
fn normalize_row(
  table: &Table,
  columns: &ColumnMap,
  row: usize,
) -> Result<Option<ExpenseRecord>> {
  if table.rows[row].iter().all(|c| c.is_blank()) {
    return Ok(None);
  }

  let cells = RowCells { table, columns, row };
  let employee_id = cells.employee_id(ColumnRole::EmployeeId)?;
  let year = cells.integer(ColumnRole::Year)?;
  let month = cells.integer(ColumnRole::Month)?;

  let year = i32::try_from(year)
    .map_err(|_| cells.invalid(ColumnRole::Year, "year out of range"))?;
  let period = u32::try_from(month)
    .ok()
    .and_then(|m| Period::new(year, m).ok())
    .ok_or_else(|| cells.invalid(ColumnRole::Month, "month must be 1-12"))?;

  let amounts = Amounts {
    salary:       cells.amount(ColumnRole::Salary)?,
    housing_fund: cells.amount(ColumnRole::HousingFund)?,
    pension:      cells.amount(ColumnRole::Pension)?,
    unemployment: cells.amount(ColumnRole::Unemployment)?,
    medical_1:    cells.amount(ColumnRole::Medical1)?,
    medical_2:    cells.amount(ColumnRole::Medical2)?,
    injury:       cells.amount(ColumnRole::Injury)?,
    union_fee:    cells.amount(ColumnRole::UnionFee)?,
  };

  Ok(Some(ExpenseRecord {
    employee_id,
    year: period.year,
    month: period.month,
    amounts,
  }))
}

// ─── Cell access ─────────────────────────────────────────────────────────────

/// Typed access to the cells of one row, producing row-scoped errors.
pub(crate) struct RowCells<'a> {
  pub table:   &'a Table,
  pub columns: &'a ColumnMap,
  pub row:     usize,
}

impl RowCells<'_> {
  fn cell(&self, role: ColumnRole) -> Option<&Cell> {
    self.columns.index(role).map(|col| self.table.cell(self.row, col))
  }

  pub fn invalid(&self, role: ColumnRole, reason: &str) -> Error {
    Error::InvalidRow {
      row:    self.table.line_number(self.row),
      column: role.code().to_owned(),
      value:  self.cell(role).map(|c| c.raw()).unwrap_or_default(),
      reason: reason.to_owned(),
    }
  }

  pub fn employee_id(&self, role: ColumnRole) -> Result<EmployeeId> {
    let text = self
      .cell(role)
      .and_then(|c| c.to_text())
      .ok_or_else(|| self.invalid(role, "missing employee id"))?;
    EmployeeId::parse(&text).map_err(|e| self.invalid(role, &e.to_string()))
  }

  fn integer(&self, role: ColumnRole) -> Result<i64> {
    self
      .cell(role)
      .and_then(|c| c.to_integer())
      .ok_or_else(|| self.invalid(role, "expected a whole number"))
  }

  /// Missing columns and blank cells are zero.
  pub fn amount(&self, role: ColumnRole) -> Result<f64> {
    match self.cell(role) {
      None => Ok(0.0),
      Some(cell) => cell
        .to_amount()
        .ok_or_else(|| self.invalid(role, "expected a number")),
    }
  }
}
