//! Per-period aggregates of the ledger.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{Amounts, ExpenseRecord, Period};

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

/// Sums of every component for one `(year, month)`. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
  pub year:               i32,
  pub month:              u32,
  pub total_salary:       f64,
  pub total_housing_fund: f64,
  pub total_pension:      f64,
  pub total_unemployment: f64,
  /// `MED1 + MED2`.
  pub total_medical:      f64,
  pub total_injury:       f64,
  pub total_union_fee:    f64,
  /// Everything except salary and union fee.
  pub total_insurance:    f64,
  /// Everything, salary and union fee included.
  pub grand_total:        f64,
}

impl PeriodSummary {
  /// Build a summary from unrounded component sums.
  pub fn from_sums(period: Period, sums: &Amounts) -> Self {
    Self {
      year:               period.year,
      month:              period.month,
      total_salary:       round2(sums.salary),
      total_housing_fund: round2(sums.housing_fund),
      total_pension:      round2(sums.pension),
      total_unemployment: round2(sums.unemployment),
      total_medical:      round2(sums.medical()),
      total_injury:       round2(sums.injury),
      total_union_fee:    round2(sums.union_fee),
      total_insurance:    round2(sums.insurance()),
      grand_total:        round2(sums.total()),
    }
  }

  pub fn period(&self) -> Period {
    Period { year: self.year, month: self.month }
  }
}

/// In-memory aggregation, newest period first. Periods without records are
/// absent.
pub fn summarize<'a>(
  records: impl IntoIterator<Item = &'a ExpenseRecord>,
) -> Vec<PeriodSummary> {
  let mut by_period: BTreeMap<Period, Amounts> = BTreeMap::new();
  for record in records {
    *by_period.entry(record.period()).or_default() += record.amounts;
  }
  by_period
    .iter()
    .rev()
    .map(|(period, sums)| PeriodSummary::from_sums(*period, sums))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::EmployeeId;

  fn record(emp: &str, year: i32, month: u32, salary: f64, hf: f64) -> ExpenseRecord {
    let mut r = ExpenseRecord::new(EmployeeId::parse(emp).unwrap(), Period { year, month });
    r.amounts.salary = salary;
    r.amounts.housing_fund = hf;
    r
  }

  #[test]
  fn sums_one_period() {
    let records = [
      record("1", 2024, 1, 1000.0, 120.0),
      record("2", 2024, 1, 2000.0, 240.0),
    ];
    let summary = summarize(&records);

    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].total_salary, 3000.0);
    assert_eq!(summary[0].total_housing_fund, 360.0);
    assert_eq!(summary[0].total_insurance, 360.0);
    assert_eq!(summary[0].grand_total, 3360.0);
  }

  #[test]
  fn orders_newest_first() {
    let records = [
      record("1", 2023, 12, 1.0, 0.0),
      record("1", 2024, 2, 1.0, 0.0),
      record("1", 2024, 1, 1.0, 0.0),
    ];
    let periods: Vec<_> = summarize(&records).iter().map(|s| s.period()).collect();
    assert_eq!(periods, vec![
      Period { year: 2024, month: 2 },
      Period { year: 2024, month: 1 },
      Period { year: 2023, month: 12 },
    ]);
  }

  #[test]
  fn rounds_to_cents() {
    let records = [
      record("1", 2024, 1, 0.111, 0.0),
      record("2", 2024, 1, 0.222, 0.0),
    ];
    assert_eq!(summarize(&records)[0].total_salary, 0.33);
    assert_eq!(round2(1234.5678), 1234.57);
  }

  #[test]
  fn empty_ledger_has_no_rows() {
    assert!(summarize(&Vec::<ExpenseRecord>::new()).is_empty());
  }
}
