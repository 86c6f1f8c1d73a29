//! Expense records: one row of the ledger per employee per month.
//!
//! The serialised field names follow the spreadsheet column codes (`emp_id`,
//! `SAL`, `HF`, ...) so that JSON bodies and sheet headers line up.

use std::{
  fmt,
  ops::{Add, AddAssign},
  str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Employee id ─────────────────────────────────────────────────────────────

/// Width every stored employee id is padded to.
pub const EMPLOYEE_ID_WIDTH: usize = 5;

/// An employee identifier, left-padded with `'0'` to [`EMPLOYEE_ID_WIDTH`].
///
/// Ordering is lexicographic on the padded form, which matches numeric order
/// for purely numeric ids.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct EmployeeId(String);

impl EmployeeId {
  /// Trim and zero-pad `raw`. Empty ids, ids wider than the fixed width and
  /// ids with anything but ASCII letters and digits are rejected; nothing is
  /// ever truncated.
  pub fn parse(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
      || trimmed.len() > EMPLOYEE_ID_WIDTH
      || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
    {
      return Err(Error::InvalidEmployeeId(raw.to_owned()));
    }
    Ok(Self(format!("{trimmed:0>width$}", width = EMPLOYEE_ID_WIDTH)))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for EmployeeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for EmployeeId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for EmployeeId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<EmployeeId> for String {
  fn from(id: EmployeeId) -> Self { id.0 }
}

// ─── Period ──────────────────────────────────────────────────────────────────

/// A `(year, month)` pair, the aggregation and comparison key.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Period {
  pub year:  i32,
  pub month: u32,
}

impl Period {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(1..=12).contains(&month) {
      return Err(Error::InvalidMonth(month));
    }
    Ok(Self { year, month })
  }

  /// The calendar month before this one; January wraps to December of the
  /// previous year.
  pub fn previous(self) -> Self {
    if self.month <= 1 {
      Self { year: self.year - 1, month: 12 }
    } else {
      Self { year: self.year, month: self.month - 1 }
    }
  }
}

impl fmt::Display for Period {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

// ─── Amounts ─────────────────────────────────────────────────────────────────

/// The eight monetary columns of a ledger row. Absent values are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Amounts {
  #[serde(rename = "SAL", default)]
  pub salary:       f64,
  #[serde(rename = "HF", default)]
  pub housing_fund: f64,
  #[serde(rename = "PEN", default)]
  pub pension:      f64,
  #[serde(rename = "UEM", default)]
  pub unemployment: f64,
  #[serde(rename = "MED1", default)]
  pub medical_1:    f64,
  #[serde(rename = "MED2", default)]
  pub medical_2:    f64,
  #[serde(rename = "INJ", default)]
  pub injury:       f64,
  #[serde(rename = "UF", default)]
  pub union_fee:    f64,
}

impl Amounts {
  pub fn medical(&self) -> f64 { self.medical_1 + self.medical_2 }

  /// Social insurance and housing fund: everything except salary and union
  /// fee.
  pub fn insurance(&self) -> f64 {
    self.housing_fund
      + self.pension
      + self.unemployment
      + self.medical_1
      + self.medical_2
      + self.injury
  }

  /// Every component, salary and union fee included.
  pub fn total(&self) -> f64 { self.salary + self.insurance() + self.union_fee }
}

impl AddAssign for Amounts {
  fn add_assign(&mut self, rhs: Self) {
    self.salary += rhs.salary;
    self.housing_fund += rhs.housing_fund;
    self.pension += rhs.pension;
    self.unemployment += rhs.unemployment;
    self.medical_1 += rhs.medical_1;
    self.medical_2 += rhs.medical_2;
    self.injury += rhs.injury;
    self.union_fee += rhs.union_fee;
  }
}

impl Add for Amounts {
  type Output = Self;

  fn add(mut self, rhs: Self) -> Self {
    self += rhs;
    self
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One ledger row, uniquely identified by `(employee_id, year, month)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
  #[serde(rename = "emp_id")]
  pub employee_id: EmployeeId,
  pub year:        i32,
  pub month:       u32,
  #[serde(flatten)]
  pub amounts:     Amounts,
}

impl ExpenseRecord {
  /// A record with every monetary field at zero.
  pub fn new(employee_id: EmployeeId, period: Period) -> Self {
    Self {
      employee_id,
      year: period.year,
      month: period.month,
      amounts: Amounts::default(),
    }
  }

  pub fn period(&self) -> Period {
    Period { year: self.year, month: self.month }
  }

  /// Check the month range; deserialised records bypass [`Period::new`].
  pub fn validate(&self) -> Result<()> {
    Period::new(self.year, self.month).map(|_| ())
  }
}

// ─── Expense type ────────────────────────────────────────────────────────────

/// A named comparison dimension. `Medical` folds both medical columns
/// together and `Total` is [`Amounts::total`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
  Salary,
  HousingFund,
  Pension,
  Unemployment,
  Medical,
  Injury,
  UnionFee,
  Total,
}

impl ExpenseType {
  pub const ALL: [ExpenseType; 8] = [
    ExpenseType::Salary,
    ExpenseType::HousingFund,
    ExpenseType::Pension,
    ExpenseType::Unemployment,
    ExpenseType::Medical,
    ExpenseType::Injury,
    ExpenseType::UnionFee,
    ExpenseType::Total,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      ExpenseType::Salary => "salary",
      ExpenseType::HousingFund => "housing_fund",
      ExpenseType::Pension => "pension",
      ExpenseType::Unemployment => "unemployment",
      ExpenseType::Medical => "medical",
      ExpenseType::Injury => "injury",
      ExpenseType::UnionFee => "union_fee",
      ExpenseType::Total => "total",
    }
  }

  pub fn amount(self, amounts: &Amounts) -> f64 {
    match self {
      ExpenseType::Salary => amounts.salary,
      ExpenseType::HousingFund => amounts.housing_fund,
      ExpenseType::Pension => amounts.pension,
      ExpenseType::Unemployment => amounts.unemployment,
      ExpenseType::Medical => amounts.medical(),
      ExpenseType::Injury => amounts.injury,
      ExpenseType::UnionFee => amounts.union_fee,
      ExpenseType::Total => amounts.total(),
    }
  }
}

impl fmt::Display for ExpenseType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ExpenseType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    ExpenseType::ALL
      .into_iter()
      .find(|t| t.as_str() == s)
      .ok_or_else(|| Error::UnknownExpenseType(s.to_owned()))
  }
}
