//! Column roles and the header names accepted for each.
//!
//! Ledger sheets come in two dialects: English column codes (`emp_id`, `SAL`,
//! `HF`, ...) and the localized labels of the legacy payroll export. Both are
//! listed here; a table's headers are resolved against this mapping once,
//! before any row is read.

use std::collections::HashMap;

use crate::{Error, Result};

/// What a column means, independent of how its header is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
  EmployeeId,
  Year,
  Month,
  Salary,
  HousingFund,
  Pension,
  Unemployment,
  Medical1,
  Medical2,
  Injury,
  UnionFee,
}

impl ColumnRole {
  /// Every role of a ledger sheet, in export column order.
  pub const LEDGER: [ColumnRole; 11] = [
    ColumnRole::EmployeeId,
    ColumnRole::Year,
    ColumnRole::Month,
    ColumnRole::Salary,
    ColumnRole::HousingFund,
    ColumnRole::Pension,
    ColumnRole::Unemployment,
    ColumnRole::Medical1,
    ColumnRole::Medical2,
    ColumnRole::Injury,
    ColumnRole::UnionFee,
  ];

  /// Canonical English code, also the CSV export header.
  pub fn code(self) -> &'static str {
    match self {
      ColumnRole::EmployeeId => "emp_id",
      ColumnRole::Year => "year",
      ColumnRole::Month => "month",
      ColumnRole::Salary => "SAL",
      ColumnRole::HousingFund => "HF",
      ColumnRole::Pension => "PEN",
      ColumnRole::Unemployment => "UEM",
      ColumnRole::Medical1 => "MED1",
      ColumnRole::Medical2 => "MED2",
      ColumnRole::Injury => "INJ",
      ColumnRole::UnionFee => "UF",
    }
  }

  /// Accepted header spellings. English codes compare case-insensitively.
  pub fn headers(self) -> &'static [&'static str] {
    match self {
      ColumnRole::EmployeeId => &["emp_id", "员工ID"],
      ColumnRole::Year => &["year", "年份"],
      ColumnRole::Month => &["month", "月份"],
      ColumnRole::Salary => &["SAL", "salary", "工资总额", "工资"],
      ColumnRole::HousingFund => &["HF", "住房公积金"],
      ColumnRole::Pension => &["PEN", "养老保险"],
      ColumnRole::Unemployment => &["UEM", "失业保险"],
      ColumnRole::Medical1 => &["MED1", "医疗保险1"],
      ColumnRole::Medical2 => &["MED2", "医疗保险2"],
      ColumnRole::Injury => &["INJ", "工伤保险"],
      ColumnRole::UnionFee => &["UF", "工会经费", "工会费"],
    }
  }

  /// Salary may be absent from a primary sheet; it is filled by backfill.
  pub fn required(self) -> bool { !matches!(self, ColumnRole::Salary) }

  pub fn matches(self, header: &str) -> bool {
    let header = header.trim();
    self.headers().iter().any(|h| h.eq_ignore_ascii_case(header))
  }
}

/// Column index of each resolved role.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
  indices: HashMap<ColumnRole, usize>,
}

impl ColumnMap {
  /// Resolve `roles` against `headers`. The first matching header wins.
  /// Fails with every missing required role listed by its code.
  pub fn resolve(headers: &[String], roles: &[ColumnRole]) -> Result<Self> {
    let mut indices = HashMap::new();
    let mut missing = Vec::new();

    for &role in roles {
      match headers.iter().position(|h| role.matches(h)) {
        Some(idx) => {
          indices.insert(role, idx);
        }
        None if role.required() => missing.push(role.code().to_owned()),
        None => {}
      }
    }

    if !missing.is_empty() {
      return Err(Error::MissingColumns(missing));
    }
    Ok(Self { indices })
  }

  pub fn index(&self, role: ColumnRole) -> Option<usize> {
    self.indices.get(&role).copied()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn resolves_english_codes_case_insensitively() {
    let h = headers(&["EMP_ID", "Year", "month", "sal", "hf", "pen", "uem", "med1", "med2", "inj", "uf"]);
    let map = ColumnMap::resolve(&h, &ColumnRole::LEDGER).unwrap();
    assert_eq!(map.index(ColumnRole::EmployeeId), Some(0));
    assert_eq!(map.index(ColumnRole::UnionFee), Some(10));
  }

  #[test]
  fn resolves_localized_labels() {
    let h = headers(&[
      "员工ID", "年份", "月份", "工资总额", "住房公积金", "养老保险",
      "失业保险", "医疗保险1", "医疗保险2", "工伤保险", "工会经费",
    ]);
    let map = ColumnMap::resolve(&h, &ColumnRole::LEDGER).unwrap();
    assert_eq!(map.index(ColumnRole::Salary), Some(3));
    assert_eq!(map.index(ColumnRole::Injury), Some(9));
  }

  #[test]
  fn salary_column_is_optional() {
    let h = headers(&["emp_id", "year", "month", "HF", "PEN", "UEM", "MED1", "MED2", "INJ", "UF"]);
    let map = ColumnMap::resolve(&h, &ColumnRole::LEDGER).unwrap();
    assert_eq!(map.index(ColumnRole::Salary), None);
  }

  #[test]
  fn reports_every_missing_column() {
    let h = headers(&["emp_id", "year", "SAL", "HF", "PEN", "UEM", "MED1", "INJ"]);
    let err = ColumnMap::resolve(&h, &ColumnRole::LEDGER).unwrap_err();
    match err {
      Error::MissingColumns(cols) => assert_eq!(cols, vec!["month", "MED2", "UF"]),
      other => panic!("unexpected error: {other}"),
    }
  }
}
