//! Salary backfill: merging a wide salary table into expense records.
//!
//! The secondary source is a sheet with one row per employee and one column
//! per calendar month. It is indexed once into a [`SalaryTable`]; the merge
//! then overwrites salaries, synthesises rows the primary set lacks, and drops
//! every record that still has no salary.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::record::{EmployeeId, ExpenseRecord, Period};

// ─── Index ───────────────────────────────────────────────────────────────────

/// `employee_id → month → salary`, holding nonzero amounts only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalaryTable {
  entries: BTreeMap<EmployeeId, BTreeMap<u32, f64>>,
}

impl SalaryTable {
  pub fn new() -> Self { Self::default() }

  /// Record `salary` for `(employee_id, month)`. Zero means "not applicable"
  /// and is ignored; a later nonzero value for the same key overwrites.
  pub fn insert(&mut self, employee_id: EmployeeId, month: u32, salary: f64) {
    if salary == 0.0 {
      return;
    }
    self.entries.entry(employee_id).or_default().insert(month, salary);
  }

  pub fn get(&self, employee_id: &EmployeeId, month: u32) -> Option<f64> {
    self.entries.get(employee_id)?.get(&month).copied()
  }

  /// Number of `(employee, month)` entries.
  pub fn len(&self) -> usize { self.entries.values().map(BTreeMap::len).sum() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// All entries ordered by employee id, then month.
  pub fn iter(&self) -> impl Iterator<Item = (&EmployeeId, u32, f64)> + '_ {
    self
      .entries
      .iter()
      .flat_map(|(id, months)| months.iter().map(move |(m, s)| (id, *m, *s)))
  }
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// The merged records plus counters describing what the merge did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillOutcome {
  pub records:        Vec<ExpenseRecord>,
  /// Primary records whose salary was taken from the salary table.
  pub overwritten:    usize,
  /// Records created for table entries with no primary row.
  pub synthesized:    usize,
  /// Records discarded because their final salary was zero.
  pub dropped:        usize,
  /// `(employee_id, month)` keys that appeared more than once in the primary
  /// input of the target year. They are kept as-is.
  pub duplicate_keys: Vec<(EmployeeId, u32)>,
}

/// Merge `salaries` into `primary` for the records of `year`.
///
/// Records of other years are not backfilled but still pass through the
/// zero-salary filter. Output order is the primary order followed by the
/// synthesised records in `(employee_id, month)` order.
pub fn backfill(
  primary: Vec<ExpenseRecord>,
  salaries: &SalaryTable,
  year: i32,
) -> BackfillOutcome {
  let mut outcome = BackfillOutcome::default();
  let mut seen: HashSet<(EmployeeId, u32)> = HashSet::new();
  let mut duplicates: BTreeSet<(EmployeeId, u32)> = BTreeSet::new();

  let mut merged = Vec::with_capacity(primary.len() + salaries.len());
  for mut record in primary {
    if record.year == year {
      let key = (record.employee_id.clone(), record.month);
      if !seen.insert(key.clone()) {
        duplicates.insert(key);
      }
      if let Some(salary) = salaries.get(&record.employee_id, record.month) {
        record.amounts.salary = salary;
        outcome.overwritten += 1;
      }
    }
    merged.push(record);
  }

  for (employee_id, month, salary) in salaries.iter() {
    if seen.contains(&(employee_id.clone(), month)) {
      continue;
    }
    let mut record = ExpenseRecord::new(employee_id.clone(), Period { year, month });
    record.amounts.salary = salary;
    merged.push(record);
    outcome.synthesized += 1;
  }

  let before = merged.len();
  merged.retain(|r| r.amounts.salary != 0.0);
  outcome.dropped = before - merged.len();

  if !duplicates.is_empty() {
    tracing::warn!(
      count = duplicates.len(),
      "primary input holds duplicate employee/month rows; kept unmerged"
    );
  }

  outcome.records = merged;
  outcome.duplicate_keys = duplicates.into_iter().collect();
  outcome
}

#[cfg(test)]
mod tests {
  use super::*;

  fn id(s: &str) -> EmployeeId { EmployeeId::parse(s).unwrap() }

  fn record(emp: &str, month: u32, salary: f64, hf: f64) -> ExpenseRecord {
    let mut r = ExpenseRecord::new(id(emp), Period { year: 2024, month });
    r.amounts.salary = salary;
    r.amounts.housing_fund = hf;
    r
  }

  fn table(entries: &[(&str, u32, f64)]) -> SalaryTable {
    let mut t = SalaryTable::new();
    for (emp, month, salary) in entries {
      t.insert(id(emp), *month, *salary);
    }
    t
  }

  #[test]
  fn zero_salaries_are_not_indexed() {
    let t = table(&[("1", 1, 0.0), ("1", 2, 3000.0)]);
    assert_eq!(t.len(), 1);
    assert_eq!(t.get(&id("1"), 1), None);
    assert_eq!(t.get(&id("1"), 2), Some(3000.0));
  }

  #[test]
  fn overwrites_existing_salary_unconditionally() {
    let primary = vec![record("1", 1, 999.0, 120.0)];
    let out = backfill(primary, &table(&[("1", 1, 5000.0)]), 2024);

    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].amounts.salary, 5000.0);
    assert_eq!(out.records[0].amounts.housing_fund, 120.0);
    assert_eq!(out.overwritten, 1);
  }

  #[test]
  fn synthesizes_rows_missing_from_primary() {
    let primary = vec![record("1", 1, 0.0, 120.0)];
    let out = backfill(primary, &table(&[("1", 1, 5000.0), ("2", 3, 4000.0)]), 2024);

    assert_eq!(out.synthesized, 1);
    let new = &out.records[1];
    assert_eq!(new.employee_id.as_str(), "00002");
    assert_eq!(new.period(), Period { year: 2024, month: 3 });
    assert_eq!(new.amounts.salary, 4000.0);
    assert_eq!(new.amounts.total(), 4000.0);
  }

  #[test]
  fn drops_records_without_salary() {
    let primary = vec![record("1", 1, 0.0, 120.0), record("2", 1, 3000.0, 0.0)];
    let out = backfill(primary, &SalaryTable::new(), 2024);

    assert_eq!(out.dropped, 1);
    assert_eq!(out.records.len(), 1);
    assert!(out.records.iter().all(|r| r.amounts.salary != 0.0));
  }

  #[test]
  fn merge_is_idempotent() {
    let salaries = table(&[("1", 1, 5000.0), ("1", 2, 5100.0), ("3", 1, 2000.0)]);
    let primary = vec![record("1", 1, 0.0, 120.0), record("2", 1, 0.0, 50.0)];

    let once = backfill(primary, &salaries, 2024);
    let twice = backfill(once.records.clone(), &salaries, 2024);

    assert_eq!(once.records, twice.records);
    assert_eq!(twice.synthesized, 0);
    assert_eq!(twice.dropped, 0);
  }

  #[test]
  fn other_years_are_not_backfilled() {
    let mut old = record("1", 1, 1000.0, 0.0);
    old.year = 2023;
    let out = backfill(vec![old], &table(&[("1", 1, 5000.0)]), 2024);

    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[0].amounts.salary, 1000.0);
    assert_eq!(out.records[1].year, 2024);
    assert_eq!(out.records[1].amounts.salary, 5000.0);
  }

  #[test]
  fn primary_duplicates_are_kept_and_reported() {
    let primary = vec![record("1", 1, 100.0, 0.0), record("1", 1, 200.0, 0.0)];
    let out = backfill(primary, &table(&[("1", 1, 5000.0)]), 2024);

    assert_eq!(out.records.len(), 2);
    assert!(out.records.iter().all(|r| r.amounts.salary == 5000.0));
    assert_eq!(out.duplicate_keys, vec![(id("1"), 1)]);
  }
}
