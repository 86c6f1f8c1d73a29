//! In-memory tables read from workbooks or CSV files.
//!
//! Every input format is reduced to a header row plus data rows of [`Cell`]s
//! before any column is interpreted.

use std::{io::Read, path::Path};

use calamine::{Data, Reader, open_workbook_auto};

use crate::{Error, Result};

// ─── Cells ───────────────────────────────────────────────────────────────────

/// A raw spreadsheet value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
  Empty,
  Number(f64),
  Text(String),
  Bool(bool),
}

static EMPTY: Cell = Cell::Empty;

fn number_text(n: f64) -> String {
  if n.fract() == 0.0 && n.abs() < 1e15 { format!("{}", n as i64) } else { n.to_string() }
}

impl Cell {
  /// Empty, whitespace-only text, or NaN.
  pub fn is_blank(&self) -> bool {
    match self {
      Cell::Empty => true,
      Cell::Number(n) => n.is_nan(),
      Cell::Text(s) => s.trim().is_empty(),
      Cell::Bool(_) => false,
    }
  }

  /// Trimmed text form; integral numbers render without a fraction so that
  /// an id stored as `1.0` reads as `"1"`.
  pub fn to_text(&self) -> Option<String> {
    if self.is_blank() {
      return None;
    }
    Some(match self {
      Cell::Number(n) => number_text(*n),
      Cell::Text(s) => {
        let s = s.trim();
        // CSV fields arrive as text; `1.0` must read like the numeric cell.
        match s.parse::<f64>() {
          Ok(n) if s.contains('.') && n.is_finite() && n.fract() == 0.0 => number_text(n),
          _ => s.to_owned(),
        }
      }
      Cell::Bool(b) => b.to_string(),
      Cell::Empty => unreachable!("blank cells return early"),
    })
  }

  /// Whole-number value. `None` for blank, fractional or non-numeric cells.
  pub fn to_integer(&self) -> Option<i64> {
    let value = match self {
      Cell::Number(n) => *n,
      Cell::Text(s) => {
        let s = s.trim();
        match s.parse::<i64>() {
          Ok(i) => return Some(i),
          Err(_) => s.parse::<f64>().ok()?,
        }
      }
      Cell::Empty | Cell::Bool(_) => return None,
    };
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
  }

  /// Monetary value: blank and NaN count as zero, text is parsed after
  /// removing thousands separators. `None` only when the cell holds something
  /// that is not a number.
  pub fn to_amount(&self) -> Option<f64> {
    if self.is_blank() {
      return Some(0.0);
    }
    match self {
      Cell::Number(n) => Some(*n),
      Cell::Text(s) => {
        let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
        if cleaned.eq_ignore_ascii_case("nan") {
          return Some(0.0);
        }
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
      }
      Cell::Bool(_) | Cell::Empty => None,
    }
  }

  /// Display form used in error messages.
  pub fn raw(&self) -> String {
    match self {
      Cell::Empty => String::new(),
      Cell::Number(n) => n.to_string(),
      Cell::Text(s) => s.clone(),
      Cell::Bool(b) => b.to_string(),
    }
  }
}

impl From<&Data> for Cell {
  fn from(data: &Data) -> Self {
    match data {
      Data::Empty => Cell::Empty,
      Data::Int(i) => Cell::Number(*i as f64),
      Data::Float(f) => Cell::Number(*f),
      Data::Bool(b) => Cell::Bool(*b),
      Data::String(s) => Cell::Text(s.clone()),
      other => Cell::Text(other.to_string()),
    }
  }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// A header row and the data rows beneath it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
  pub headers: Vec<String>,
  pub rows:    Vec<Vec<Cell>>,
}

impl Table {
  /// Build a table from raw rows; the first non-blank row is the header.
  pub fn from_rows(rows: impl IntoIterator<Item = Vec<Cell>>) -> Self {
    let mut rows = rows
      .into_iter()
      .skip_while(|row| row.iter().all(Cell::is_blank));

    let headers = rows
      .next()
      .map(|row| row.iter().map(|c| c.to_text().unwrap_or_default()).collect())
      .unwrap_or_default();

    Self { headers, rows: rows.collect() }
  }

  /// Read a CSV stream with a header row.
  pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
    let mut reader = csv::ReaderBuilder::new()
      .has_headers(false)
      .flexible(true)
      .trim(csv::Trim::All)
      .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
      let record = record?;
      rows.push(
        record
          .iter()
          .map(|field| {
            if field.is_empty() {
              Cell::Empty
            } else {
              Cell::Text(field.to_owned())
            }
          })
          .collect(),
      );
    }
    Ok(Self::from_rows(rows))
  }

  /// The cell at `(row, col)`; short rows read as empty.
  pub fn cell(&self, row: usize, col: usize) -> &Cell {
    self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
  }

  /// 1-based spreadsheet row number of data row `row`.
  pub fn line_number(&self, row: usize) -> usize { row + 2 }
}

// ─── Files ───────────────────────────────────────────────────────────────────

fn extension(path: &Path) -> String {
  path
    .extension()
    .and_then(|s| s.to_str())
    .unwrap_or_default()
    .to_ascii_lowercase()
}

/// Names of the sheets in a workbook. A CSV file has no sheet names.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
  match extension(path).as_str() {
    "csv" => Ok(Vec::new()),
    "xlsx" | "xlsm" | "xls" | "ods" => {
      let workbook = open_workbook_auto(path)?;
      Ok(workbook.sheet_names().to_owned())
    }
    other => Err(Error::UnsupportedFormat(other.to_owned())),
  }
}

/// Read `sheet` (or the first sheet) of the workbook at `path`. For CSV files
/// the sheet name is ignored.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
  match extension(path).as_str() {
    "csv" => Table::from_csv_reader(std::fs::File::open(path)?),
    "xlsx" | "xlsm" | "xls" | "ods" => {
      let mut workbook = open_workbook_auto(path)?;
      let names = workbook.sheet_names().to_owned();
      let name = match sheet {
        Some(wanted) => names
          .iter()
          .find(|n| n.as_str() == wanted)
          .cloned()
          .ok_or_else(|| Error::SheetNotFound(wanted.to_owned()))?,
        None => names.first().cloned().ok_or(Error::EmptyWorkbook)?,
      };

      let range = workbook.worksheet_range(&name)?;
      let table = Table::from_rows(
        range.rows().map(|row| row.iter().map(Cell::from).collect::<Vec<_>>()),
      );
      tracing::debug!(sheet = %name, rows = table.rows.len(), "read worksheet");
      Ok(table)
    }
    other => Err(Error::UnsupportedFormat(other.to_owned())),
  }
}
