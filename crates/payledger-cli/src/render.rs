//! Plain-text tables for terminal output.

use payledger_core::{
  compare::{Change, EmployeeChange, PeriodComparison},
  record::{ExpenseType, Period},
  report::PeriodSummary,
  store::ImportReceipt,
};

fn rate(change: &Change) -> String { format!("{:+.2}%", change.change_rate) }

/// One `current previous change rate` line under a left-aligned label.
fn change_line(label: &str, width: usize, c: &Change) -> String {
  format!(
    "{label:<width$} {:>12.2} {:>12.2} {:>12.2} {:>10}\n",
    c.current,
    c.previous,
    c.change,
    rate(c),
  )
}

pub fn summary_table(rows: &[PeriodSummary]) -> String {
  if rows.is_empty() {
    return "no records\n".to_owned();
  }

  let mut out = format!(
    "{:<8} {:>12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12}\n",
    "period", "salary", "housing", "pension", "unemploy", "medical", "injury", "union", "insurance",
    "total",
  );
  for r in rows {
    out.push_str(&format!(
      "{:<8} {:>12.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12.2} {:>12.2}\n",
      r.period().to_string(),
      r.total_salary,
      r.total_housing_fund,
      r.total_pension,
      r.total_unemployment,
      r.total_medical,
      r.total_injury,
      r.total_union_fee,
      r.total_insurance,
      r.grand_total,
    ));
  }
  out
}

/// Totals per dimension, then one line per employee with the total change.
pub fn comparison_table(cmp: &PeriodComparison) -> String {
  let mut out = format!("{} vs {}\n", cmp.period, cmp.previous_period);
  out.push_str(&format!(
    "{:<14} {:>12} {:>12} {:>12} {:>10}\n",
    "dimension", "current", "previous", "change", "rate"
  ));
  for t in ExpenseType::ALL {
    out.push_str(&change_line(t.as_str(), 14, cmp.totals.get(t)));
  }

  if !cmp.rows.is_empty() {
    out.push_str(&format!(
      "\n{:<8} {:>12} {:>12} {:>12} {:>10}\n",
      "emp_id", "current", "previous", "change", "rate"
    ));
    for row in &cmp.rows {
      out.push_str(&change_line(row.employee_id.as_str(), 8, &row.changes.total));
    }
  }
  out
}

pub fn employee_changes(period: Period, expense_type: ExpenseType, rows: &[EmployeeChange]) -> String {
  let mut out = format!("{expense_type}: {} vs {}\n", period, period.previous());
  out.push_str(&format!(
    "{:<8} {:>12} {:>12} {:>12} {:>10}\n",
    "emp_id", "current", "previous", "change", "rate"
  ));
  for row in rows {
    out.push_str(&change_line(row.employee_id.as_str(), 8, &row.change));
  }
  out
}

pub fn history_table(imports: &[ImportReceipt]) -> String {
  if imports.is_empty() {
    return "no imports\n".to_owned();
  }

  let mut out = String::new();
  for r in imports {
    out.push_str(&format!(
      "{}  {}  {:<11} {:>6}  {}\n",
      r.imported_at.format("%Y-%m-%d %H:%M:%S"),
      r.import_id,
      r.strategy.as_str(),
      r.written,
      r.source.as_deref().unwrap_or("-"),
    ));
  }
  out
}

#[cfg(test)]
mod tests {
  use payledger_core::{
    compare::{compare_expense_type, compare_periods},
    record::{EmployeeId, ExpenseRecord},
    report::summarize,
  };

  use super::*;

  fn record(id: &str, period: Period, salary: f64) -> ExpenseRecord {
    let mut r = ExpenseRecord::new(EmployeeId::parse(id).unwrap(), period);
    r.amounts.salary = salary;
    r
  }

  #[test]
  fn summary_lists_periods() {
    let feb = Period { year: 2024, month: 2 };
    let text = summary_table(&summarize(&[record("1", feb, 1234.5)]));
    assert!(text.lines().nth(1).unwrap().starts_with("2024-02"));
    assert!(text.contains("1234.50"));
    assert_eq!(summary_table(&[]), "no records\n");
  }

  #[test]
  fn comparison_shows_signed_rates() {
    let feb = Period { year: 2024, month: 2 };
    let cmp = compare_periods(feb, &[record("1", feb, 150.0)], &[record("1", feb.previous(), 200.0)]);
    let text = comparison_table(&cmp);
    assert!(text.starts_with("2024-02 vs 2024-01\n"));
    assert!(text.contains("-25.00%"));
    assert!(text.contains("00001"));
  }

  #[test]
  fn employee_changes_one_line_per_row() {
    let feb = Period { year: 2024, month: 2 };
    let rows = compare_expense_type(
      &[record("1", feb, 100.0), record("2", feb, 50.0)],
      &[record("1", feb.previous(), 100.0)],
      ExpenseType::Salary,
    );
    let text = employee_changes(feb, ExpenseType::Salary, &rows);
    let lines: Vec<&str> = text.lines().collect();

    assert!(text.ends_with('\n'));
    assert_eq!(lines.len(), 4);
    assert!(lines[2].starts_with("00001   "));
    assert!(lines[2].ends_with("+0.00%"));
    assert!(lines[3].starts_with("00002   "));
    assert!(lines[3].ends_with("+100.00%"));
    assert_eq!(history_table(&[]), "no imports\n");
  }
}
