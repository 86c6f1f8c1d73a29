//! SQL schema for the ledger store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per employee per month.
CREATE TABLE IF NOT EXISTS expense (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    emp_id      TEXT    NOT NULL CHECK (length(emp_id) = 5),
    year        INTEGER NOT NULL,
    month       INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    SAL         REAL    NOT NULL DEFAULT 0,   -- salary
    HF          REAL    NOT NULL DEFAULT 0,   -- housing fund
    PEN         REAL    NOT NULL DEFAULT 0,   -- pension
    UEM         REAL    NOT NULL DEFAULT 0,   -- unemployment insurance
    MED1        REAL    NOT NULL DEFAULT 0,   -- medical insurance 1
    MED2        REAL    NOT NULL DEFAULT 0,   -- medical insurance 2
    INJ         REAL    NOT NULL DEFAULT 0,   -- injury insurance
    UF          REAL    NOT NULL DEFAULT 0,   -- union fee
    create_time TEXT,                         -- 'YYYY-MM-DD HH:MM:SS' UTC of the import
    UNIQUE (emp_id, year, month)
);

CREATE INDEX IF NOT EXISTS expense_period_idx ON expense(year, month);

-- Audit trail; one row per committed import batch.
CREATE TABLE IF NOT EXISTS imports (
    import_id   TEXT    PRIMARY KEY,
    strategy    TEXT    NOT NULL,   -- 'replace' | 'upsert' | 'append_only'
    source      TEXT,
    digest      TEXT,               -- hex SHA-256 of the source file
    written     INTEGER NOT NULL,
    imported_at TEXT    NOT NULL    -- RFC 3339 UTC
);

PRAGMA user_version = 1;
";
