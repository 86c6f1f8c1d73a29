//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Receipt timestamps are RFC 3339 strings; the ledger's `create_time` uses
//! `YYYY-MM-DD HH:MM:SS`. UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use payledger_core::{
  record::{Amounts, EmployeeId, ExpenseRecord, Period},
  store::{ImportReceipt, ImportStrategy},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_create_time(dt: DateTime<Utc>) -> String {
  dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column values of one `expense` row, in schema order.
pub struct RawRecord {
  pub emp_id: String,
  pub year:   i64,
  pub month:  i64,
  pub sal:    f64,
  pub hf:     f64,
  pub pen:    f64,
  pub uem:    f64,
  pub med1:   f64,
  pub med2:   f64,
  pub inj:    f64,
  pub uf:     f64,
}

/// The column list shared by every record `SELECT`.
pub const RECORD_COLUMNS: &str =
  "emp_id, year, month, SAL, HF, PEN, UEM, MED1, MED2, INJ, UF";

impl RawRecord {
  pub fn from_record(r: &ExpenseRecord) -> Self {
    let a = &r.amounts;
    Self {
      emp_id: r.employee_id.as_str().to_owned(),
      year:   i64::from(r.year),
      month:  i64::from(r.month),
      sal:    a.salary,
      hf:     a.housing_fund,
      pen:    a.pension,
      uem:    a.unemployment,
      med1:   a.medical_1,
      med2:   a.medical_2,
      inj:    a.injury,
      uf:     a.union_fee,
    }
  }

  /// Map a row selected with [`RECORD_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      emp_id: row.get(0)?,
      year:   row.get(1)?,
      month:  row.get(2)?,
      sal:    row.get(3)?,
      hf:     row.get(4)?,
      pen:    row.get(5)?,
      uem:    row.get(6)?,
      med1:   row.get(7)?,
      med2:   row.get(8)?,
      inj:    row.get(9)?,
      uf:     row.get(10)?,
    })
  }

  pub fn into_record(self) -> Result<ExpenseRecord> {
    let year = i32::try_from(self.year)
      .map_err(|_| Error::DateParse(format!("year out of range: {}", self.year)))?;
    // Out-of-range months fall to 0 and fail `Period::new`.
    let month = u32::try_from(self.month).unwrap_or_default();
    let period = Period::new(year, month)?;

    Ok(ExpenseRecord {
      employee_id: EmployeeId::parse(&self.emp_id)?,
      year:        period.year,
      month:       period.month,
      amounts:     self.amounts(),
    })
  }

  pub fn amounts(&self) -> Amounts {
    Amounts {
      salary:       self.sal,
      housing_fund: self.hf,
      pension:      self.pen,
      unemployment: self.uem,
      medical_1:    self.med1,
      medical_2:    self.med2,
      injury:       self.inj,
      union_fee:    self.uf,
    }
  }
}

/// Raw values read directly from an `imports` row.
pub struct RawImport {
  pub import_id:   String,
  pub strategy:    String,
  pub source:      Option<String>,
  pub digest:      Option<String>,
  pub written:     i64,
  pub imported_at: String,
}

impl RawImport {
  pub fn from_receipt(r: &ImportReceipt) -> Self {
    Self {
      import_id:   encode_uuid(r.import_id),
      strategy:    r.strategy.as_str().to_owned(),
      source:      r.source.clone(),
      digest:      r.digest.clone(),
      written:     r.written as i64,
      imported_at: encode_dt(r.imported_at),
    }
  }

  pub fn into_receipt(self) -> Result<ImportReceipt> {
    Ok(ImportReceipt {
      import_id:   Uuid::parse_str(&self.import_id)?,
      strategy:    self.strategy.parse::<ImportStrategy>()?,
      source:      self.source,
      digest:      self.digest,
      written:     usize::try_from(self.written).unwrap_or_default(),
      imported_at: decode_dt(&self.imported_at)?,
    })
  }
}
