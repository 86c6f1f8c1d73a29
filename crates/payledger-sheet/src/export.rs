//! CSV export of ledger records.
//!
//! The header row uses the English column codes, so an exported file can be
//! imported again unchanged.

use std::io::Write;

use payledger_core::record::ExpenseRecord;

use crate::{Result, schema::ColumnRole};

/// Write `records` as CSV to `writer`.
pub fn write_csv<W: Write>(records: &[ExpenseRecord], writer: W) -> Result<()> {
  let mut out = csv::Writer::from_writer(writer);
  out.write_record(ColumnRole::LEDGER.iter().map(|r| r.code()))?;

  for r in records {
    let a = &r.amounts;
    out.write_record([
      r.employee_id.to_string(),
      r.year.to_string(),
      r.month.to_string(),
      a.salary.to_string(),
      a.housing_fund.to_string(),
      a.pension.to_string(),
      a.unemployment.to_string(),
      a.medical_1.to_string(),
      a.medical_2.to_string(),
      a.injury.to_string(),
      a.union_fee.to_string(),
    ])?;
  }

  out.flush()?;
  Ok(())
}
