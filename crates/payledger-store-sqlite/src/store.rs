//! [`SqliteStore`], the SQLite implementation of [`LedgerStore`].

use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use payledger_core::{
  record::{Amounts, ExpenseRecord, Period},
  report::PeriodSummary,
  store::{ImportBatch, ImportReceipt, ImportStrategy, LedgerStore, PeriodFilter},
};

use crate::{
  Error, Result,
  encode::{RECORD_COLUMNS, RawImport, RawRecord, encode_create_time},
  schema::SCHEMA,
};

// ─── SQL ─────────────────────────────────────────────────────────────────────

const INSERT_RECORD: &str = "
INSERT INTO expense (emp_id, year, month, SAL, HF, PEN, UEM, MED1, MED2, INJ, UF, create_time)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

const UPSERT_RECORD: &str = "
INSERT INTO expense (emp_id, year, month, SAL, HF, PEN, UEM, MED1, MED2, INJ, UF, create_time)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
ON CONFLICT (emp_id, year, month) DO UPDATE SET
    SAL         = excluded.SAL,
    HF          = excluded.HF,
    PEN         = excluded.PEN,
    UEM         = excluded.UEM,
    MED1        = excluded.MED1,
    MED2        = excluded.MED2,
    INJ         = excluded.INJ,
    UF          = excluded.UF,
    create_time = excluded.create_time";

/// `?1`/`?2` are the optional year and month; NULL matches everything.
const PERIOD_FILTER: &str = "(?1 IS NULL OR year = ?1) AND (?2 IS NULL OR month = ?2)";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A payledger expense ledger backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn select_records(
    &self,
    filter: PeriodFilter,
    order: &'static str,
  ) -> Result<Vec<ExpenseRecord>> {
    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {RECORD_COLUMNS} FROM expense WHERE {PERIOD_FILTER} ORDER BY {order}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![filter.year, filter.month], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }
}

/// Turn a unique-key violation into [`Error::DuplicateRecord`]. Other
/// constraint failures stay [`Error::Database`].
pub(crate) fn map_write_error(err: tokio_rusqlite::Error) -> Error {
  match err {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, msg))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
    {
      Error::DuplicateRecord(msg.unwrap_or_else(|| e.to_string()))
    }
    other => Error::Database(other),
  }
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteStore {
  type Error = Error;

  async fn import(
    &self,
    batch: ImportBatch,
    strategy: ImportStrategy,
  ) -> Result<ImportReceipt> {
    for record in &batch.records {
      record.validate()?;
    }

    let receipt = ImportReceipt {
      import_id:   Uuid::new_v4(),
      strategy,
      source:      batch.source,
      digest:      batch.digest,
      written:     batch.records.len(),
      imported_at: Utc::now(),
    };

    let rows: Vec<RawRecord> = batch.records.iter().map(RawRecord::from_record).collect();
    let raw_receipt = RawImport::from_receipt(&receipt);
    let create_time = encode_create_time(receipt.imported_at);

    let removed = self
      .conn
      .call(move |conn| {
        // Dropping `tx` without commit rolls the whole batch back.
        let tx = conn.transaction()?;

        let removed = match strategy {
          ImportStrategy::Replace => tx.execute("DELETE FROM expense", [])?,
          _ => 0,
        };

        {
          let sql = match strategy {
            ImportStrategy::Upsert => UPSERT_RECORD,
            ImportStrategy::Replace | ImportStrategy::AppendOnly => INSERT_RECORD,
          };
          let mut stmt = tx.prepare(sql)?;
          for r in &rows {
            stmt.execute(rusqlite::params![
              r.emp_id, r.year, r.month, r.sal, r.hf, r.pen, r.uem, r.med1, r.med2,
              r.inj, r.uf, create_time,
            ])?;
          }
        }

        tx.execute(
          "INSERT INTO imports (import_id, strategy, source, digest, written, imported_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            raw_receipt.import_id,
            raw_receipt.strategy,
            raw_receipt.source,
            raw_receipt.digest,
            raw_receipt.written,
            raw_receipt.imported_at,
          ],
        )?;

        tx.commit()?;
        Ok(removed)
      })
      .await
      .map_err(map_write_error)?;

    tracing::info!(
      import_id = %receipt.import_id,
      %strategy,
      written = receipt.written,
      removed,
      "import committed"
    );
    Ok(receipt)
  }

  async fn records_for_period(&self, period: Period) -> Result<Vec<ExpenseRecord>> {
    let filter = PeriodFilter { year: Some(period.year), month: Some(period.month) };
    self.select_records(filter, "emp_id").await
  }

  async fn list_records(&self, filter: PeriodFilter) -> Result<Vec<ExpenseRecord>> {
    self.select_records(filter, "year, month, emp_id").await
  }

  async fn monthly_summary(&self, filter: PeriodFilter) -> Result<Vec<PeriodSummary>> {
    let rows: Vec<(i64, i64, Amounts)> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT year, month,
                  SUM(SAL), SUM(HF), SUM(PEN), SUM(UEM), SUM(MED1), SUM(MED2), SUM(INJ), SUM(UF)
           FROM expense
           WHERE {PERIOD_FILTER}
           GROUP BY year, month
           ORDER BY year DESC, month DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![filter.year, filter.month], |r| {
            Ok((r.get(0)?, r.get(1)?, Amounts {
              salary:       r.get(2)?,
              housing_fund: r.get(3)?,
              pension:      r.get(4)?,
              unemployment: r.get(5)?,
              medical_1:    r.get(6)?,
              medical_2:    r.get(7)?,
              injury:       r.get(8)?,
              union_fee:    r.get(9)?,
            }))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(year, month, sums)| {
        let year = i32::try_from(year)
          .map_err(|_| Error::DateParse(format!("year out of range: {year}")))?;
        let month = u32::try_from(month).unwrap_or_default();
        Ok(PeriodSummary::from_sums(Period::new(year, month)?, &sums))
      })
      .collect()
  }

  async fn count(&self) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM expense", [], |r| r.get(0))?))
      .await?;
    Ok(usize::try_from(n).unwrap_or_default())
  }

  async fn list_imports(&self) -> Result<Vec<ImportReceipt>> {
    let raws: Vec<RawImport> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT import_id, strategy, source, digest, written, imported_at
           FROM imports
           ORDER BY imported_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map([], |r| {
            Ok(RawImport {
              import_id:   r.get(0)?,
              strategy:    r.get(1)?,
              source:      r.get(2)?,
              digest:      r.get(3)?,
              written:     r.get(4)?,
              imported_at: r.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawImport::into_receipt).collect()
  }
}
