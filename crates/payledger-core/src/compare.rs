//! Period-over-period comparison.
//!
//! A period's records are joined with the previous calendar month's records
//! on employee id (full outer join: an employee present in either month
//! appears exactly once, the missing side counting as zero).
//!
//! # Change rate
//!
//! `change / previous × 100` when `previous ≠ 0`. When `previous = 0` the rate
//! is `0` if `current` is also zero, otherwise `±100` following the sign of
//! `current`. The same rule applies to per-employee rows, totals and
//! single-dimension comparisons.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  record::{Amounts, EmployeeId, ExpenseRecord, ExpenseType, Period},
  store::LedgerStore,
};

// ─── Change ──────────────────────────────────────────────────────────────────

/// Percentage change from `previous` to `current`.
pub fn change_rate(current: f64, previous: f64) -> f64 {
  if previous != 0.0 {
    (current - previous) / previous * 100.0
  } else if current > 0.0 {
    100.0
  } else if current < 0.0 {
    -100.0
  } else {
    0.0
  }
}

/// One dimension of one comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Change {
  pub current:     f64,
  pub previous:    f64,
  pub change:      f64,
  pub change_rate: f64,
}

impl Change {
  pub fn new(current: f64, previous: f64) -> Self {
    Self {
      current,
      previous,
      change: current - previous,
      change_rate: change_rate(current, previous),
    }
  }
}

/// A [`Change`] for every [`ExpenseType`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Changes {
  pub salary:       Change,
  pub housing_fund: Change,
  pub pension:      Change,
  pub unemployment: Change,
  pub medical:      Change,
  pub injury:       Change,
  pub union_fee:    Change,
  pub total:        Change,
}

impl Changes {
  fn from_fn(mut f: impl FnMut(ExpenseType) -> Change) -> Self {
    Self {
      salary:       f(ExpenseType::Salary),
      housing_fund: f(ExpenseType::HousingFund),
      pension:      f(ExpenseType::Pension),
      unemployment: f(ExpenseType::Unemployment),
      medical:      f(ExpenseType::Medical),
      injury:       f(ExpenseType::Injury),
      union_fee:    f(ExpenseType::UnionFee),
      total:        f(ExpenseType::Total),
    }
  }

  pub fn between(current: &Amounts, previous: &Amounts) -> Self {
    Self::from_fn(|t| Change::new(t.amount(current), t.amount(previous)))
  }

  pub fn get(&self, expense_type: ExpenseType) -> &Change {
    match expense_type {
      ExpenseType::Salary => &self.salary,
      ExpenseType::HousingFund => &self.housing_fund,
      ExpenseType::Pension => &self.pension,
      ExpenseType::Unemployment => &self.unemployment,
      ExpenseType::Medical => &self.medical,
      ExpenseType::Injury => &self.injury,
      ExpenseType::UnionFee => &self.union_fee,
      ExpenseType::Total => &self.total,
    }
  }
}

// ─── Report types ────────────────────────────────────────────────────────────

/// One employee's month-over-month figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
  #[serde(rename = "emp_id")]
  pub employee_id: EmployeeId,
  #[serde(flatten)]
  pub changes:     Changes,
}

/// Full comparison of a period against the one before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
  pub period:          Period,
  pub previous_period: Period,
  /// Ordered by employee id ascending.
  pub rows:            Vec<ComparisonRow>,
  /// Column sums with rates recomputed from the summed values.
  pub totals:          Changes,
}

impl PeriodComparison {
  /// A comparison with no rows and all-zero totals.
  pub fn empty(period: Period) -> Self {
    Self {
      period,
      previous_period: period.previous(),
      rows: Vec::new(),
      totals: Changes::default(),
    }
  }
}

/// Single-dimension comparison row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeChange {
  #[serde(rename = "emp_id")]
  pub employee_id: EmployeeId,
  #[serde(flatten)]
  pub change:      Change,
}

// ─── Join ────────────────────────────────────────────────────────────────────

/// Outer-join both periods by employee id. Duplicate rows for one employee
/// within a period are summed.
fn join(
  current: &[ExpenseRecord],
  previous: &[ExpenseRecord],
) -> BTreeMap<EmployeeId, (Amounts, Amounts)> {
  let mut joined: BTreeMap<EmployeeId, (Amounts, Amounts)> = BTreeMap::new();
  for r in current {
    joined.entry(r.employee_id.clone()).or_default().0 += r.amounts;
  }
  for r in previous {
    joined.entry(r.employee_id.clone()).or_default().1 += r.amounts;
  }
  joined
}

/// Compare `current` (records of `period`) against `previous` (records of
/// `period.previous()`).
pub fn compare_periods(
  period: Period,
  current: &[ExpenseRecord],
  previous: &[ExpenseRecord],
) -> PeriodComparison {
  let mut current_sum = Amounts::default();
  let mut previous_sum = Amounts::default();

  let rows: Vec<ComparisonRow> = join(current, previous)
    .into_iter()
    .map(|(employee_id, (cur, prev))| {
      current_sum += cur;
      previous_sum += prev;
      ComparisonRow { employee_id, changes: Changes::between(&cur, &prev) }
    })
    .collect();

  PeriodComparison {
    period,
    previous_period: period.previous(),
    rows,
    totals: Changes::between(&current_sum, &previous_sum),
  }
}

/// Per-employee comparison of a single dimension.
pub fn compare_expense_type(
  current: &[ExpenseRecord],
  previous: &[ExpenseRecord],
  expense_type: ExpenseType,
) -> Vec<EmployeeChange> {
  join(current, previous)
    .into_iter()
    .map(|(employee_id, (cur, prev))| EmployeeChange {
      employee_id,
      change: Change::new(expense_type.amount(&cur), expense_type.amount(&prev)),
    })
    .collect()
}

// ─── Store-backed entry points ───────────────────────────────────────────────

/// Load `period` and its predecessor from `store` and compare them.
pub async fn period_comparison<S: LedgerStore>(
  store: &S,
  period: Period,
) -> Result<PeriodComparison, S::Error> {
  let current = store.records_for_period(period).await?;
  let previous = store.records_for_period(period.previous()).await?;
  Ok(compare_periods(period, &current, &previous))
}

/// Load `period` and its predecessor from `store` and compare one dimension.
pub async fn employee_comparison<S: LedgerStore>(
  store: &S,
  period: Period,
  expense_type: ExpenseType,
) -> Result<Vec<EmployeeChange>, S::Error> {
  let current = store.records_for_period(period).await?;
  let previous = store.records_for_period(period.previous()).await?;
  Ok(compare_expense_type(&current, &previous, expense_type))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(emp: &str, year: i32, month: u32, salary: f64, hf: f64) -> ExpenseRecord {
    let mut r = ExpenseRecord::new(EmployeeId::parse(emp).unwrap(), Period { year, month });
    r.amounts.salary = salary;
    r.amounts.housing_fund = hf;
    r
  }

  #[test]
  fn zero_previous_convention() {
    assert_eq!(change_rate(0.0, 0.0), 0.0);
    assert_eq!(change_rate(5000.0, 0.0), 100.0);
    assert_eq!(change_rate(-10.0, 0.0), -100.0);
    assert_eq!(change_rate(110.0, 100.0), 10.0);
    assert_eq!(change_rate(50.0, 100.0), -50.0);
  }

  #[test]
  fn new_employee_counts_as_full_increase() {
    let period = Period { year: 2024, month: 2 };
    let current = [record("1", 2024, 2, 5000.0, 0.0)];
    let cmp = compare_periods(period, &current, &[]);

    assert_eq!(cmp.rows.len(), 1);
    let salary = cmp.rows[0].changes.salary;
    assert_eq!(salary.change, 5000.0);
    assert_eq!(salary.change_rate, 100.0);
    assert_eq!(cmp.rows[0].changes.pension, Change::default());
  }

  #[test]
  fn outer_join_keeps_employees_from_both_sides() {
    let period = Period { year: 2024, month: 3 };
    let current = [record("3", 2024, 3, 100.0, 0.0), record("1", 2024, 3, 200.0, 0.0)];
    let previous = [record("2", 2024, 2, 300.0, 0.0), record("1", 2024, 2, 100.0, 0.0)];
    let cmp = compare_periods(period, &current, &previous);

    let ids: Vec<_> = cmp.rows.iter().map(|r| r.employee_id.as_str()).collect();
    assert_eq!(ids, vec!["00001", "00002", "00003"]);

    let left = &cmp.rows[1].changes.salary;
    assert_eq!((left.current, left.previous, left.change), (0.0, 300.0, -300.0));
    assert_eq!(left.change_rate, -100.0);
  }

  #[test]
  fn totals_recompute_rate_from_sums() {
    let period = Period { year: 2024, month: 2 };
    let current = [record("1", 2024, 2, 150.0, 0.0), record("2", 2024, 2, 100.0, 0.0)];
    let previous = [record("1", 2024, 1, 100.0, 0.0), record("2", 2024, 1, 300.0, 0.0)];
    let cmp = compare_periods(period, &current, &previous);

    // Row rates are +50% and -66.7%; the total rate is 250 vs 400.
    assert_eq!(cmp.totals.salary.current, 250.0);
    assert_eq!(cmp.totals.salary.previous, 400.0);
    assert_eq!(cmp.totals.salary.change, -150.0);
    assert_eq!(cmp.totals.salary.change_rate, -37.5);
  }

  #[test]
  fn duplicate_rows_for_one_employee_are_summed() {
    let period = Period { year: 2024, month: 2 };
    let current = [record("1", 2024, 2, 100.0, 10.0), record("00001", 2024, 2, 50.0, 5.0)];
    let previous = [record("1", 2024, 1, 100.0, 10.0)];
    let cmp = compare_periods(period, &current, &previous);

    assert_eq!(cmp.rows.len(), 1);
    let row = &cmp.rows[0].changes;
    assert_eq!((row.salary.current, row.salary.previous), (150.0, 100.0));
    assert_eq!(row.salary.change_rate, 50.0);
    assert_eq!(row.housing_fund.current, 15.0);
    assert_eq!(cmp.totals, *row);

    let single = compare_expense_type(&current, &previous, ExpenseType::Salary);
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].change.current, 150.0);
  }

  #[test]
  fn empty_periods_still_have_totals() {
    let cmp = compare_periods(Period { year: 2024, month: 1 }, &[], &[]);
    assert!(cmp.rows.is_empty());
    assert_eq!(cmp.totals, Changes::default());
    assert_eq!(cmp.previous_period, Period { year: 2023, month: 12 });
  }

  #[test]
  fn single_dimension_comparison() {
    let current = [record("1", 2024, 2, 1000.0, 120.0)];
    let previous = [record("1", 2024, 1, 1000.0, 100.0), record("2", 2024, 1, 900.0, 90.0)];
    let rows = compare_expense_type(&current, &previous, ExpenseType::HousingFund);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].change.change, 20.0);
    assert_eq!(rows[0].change.change_rate, 20.0);
    assert_eq!(rows[1].change.current, 0.0);
    assert_eq!(rows[1].change.change, -90.0);
  }

  #[test]
  fn total_includes_union_fee() {
    let mut cur = record("1", 2024, 2, 1000.0, 0.0);
    cur.amounts.union_fee = 2.0;
    let rows = compare_expense_type(&[cur], &[], ExpenseType::Total);
    assert_eq!(rows[0].change.current, 1002.0);
  }
}
