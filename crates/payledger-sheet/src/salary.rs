//! The wide salary sheet: one row per employee, one column per month.

use payledger_core::backfill::SalaryTable;

use crate::{
  Error, Result,
  normalize::{RowCells, RowPolicy},
  schema::{ColumnMap, ColumnRole},
  table::Table,
};

/// Month number of a header such as `3`, `3.0` or `3月`.
fn month_from_header(header: &str) -> Option<u32> {
  let h = header.trim();
  let h = h.strip_suffix('月').unwrap_or(h).trim();
  let month = h.parse::<u32>().ok().or_else(|| {
    let f = h.parse::<f64>().ok()?;
    (f.fract() == 0.0 && f >= 0.0).then_some(f as u32)
  })?;
  (1..=12).contains(&month).then_some(month)
}

/// Index a salary sheet. Columns other than the employee id and months 1-12
/// are ignored; blank and zero amounts mean "no salary that month".
pub fn parse_salary_table(table: &Table, policy: RowPolicy) -> Result<SalaryTable> {
  let columns = ColumnMap::resolve(&table.headers, &[ColumnRole::EmployeeId])?;
  let month_columns: Vec<(usize, u32)> = table
    .headers
    .iter()
    .enumerate()
    .filter_map(|(idx, h)| month_from_header(h).map(|m| (idx, m)))
    .collect();

  if month_columns.is_empty() {
    return Err(Error::MissingColumns(vec!["1-12".to_owned()]));
  }

  let mut salaries = SalaryTable::new();
  let mut skipped = 0usize;

  for row in 0..table.rows.len() {
    if table.rows[row].iter().all(|c| c.is_blank()) {
      continue;
    }
    let cells = RowCells { table, columns: &columns, row };

    let parsed = cells.employee_id(ColumnRole::EmployeeId).and_then(|id| {
      month_columns
        .iter()
        .map(|&(col, month)| {
          let cell = table.cell(row, col);
          cell
            .to_amount()
            .map(|amount| (month, amount))
            .ok_or_else(|| Error::InvalidRow {
              row:    table.line_number(row),
              column: table.headers[col].clone(),
              value:  cell.raw(),
              reason: "expected a number".to_owned(),
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(|amounts| (id, amounts))
    });

    match parsed {
      Ok((id, amounts)) => {
        for (month, amount) in amounts {
          salaries.insert(id.clone(), month, amount);
        }
      }
      Err(err) if policy == RowPolicy::Skip => {
        tracing::warn!(%err, "skipping invalid salary row");
        skipped += 1;
      }
      Err(err) => return Err(err),
    }
  }

  tracing::debug!(entries = salaries.len(), skipped, "indexed salary sheet");
  Ok(salaries)
}
