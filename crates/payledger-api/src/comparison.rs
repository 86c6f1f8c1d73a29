//! Handlers for `/comparison` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/comparison/{year}/{month}` | Every dimension, per employee plus totals |
//! | `GET`  | `/comparison/{year}/{month}/{expense_type}` | One dimension; 400 on an unknown type |
//!
//! Both compare against the previous calendar month. Storage faults degrade to
//! an empty comparison.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use payledger_core::{
  compare::{EmployeeChange, PeriodComparison, employee_comparison, period_comparison},
  record::{ExpenseType, Period},
  store::LedgerStore,
};
use serde::Serialize;

use crate::error::ApiError;

/// `GET /comparison/{year}/{month}`
pub async fn period<S>(
  State(store): State<Arc<S>>,
  Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<PeriodComparison>, ApiError>
where
  S: LedgerStore,
{
  let period = Period::new(year, month)?;
  let comparison = match period_comparison(store.as_ref(), period).await {
    Ok(c) => c,
    Err(err) => {
      tracing::error!(%err, %period, "period comparison failed");
      PeriodComparison::empty(period)
    }
  };
  Ok(Json(comparison))
}

// ─── Single dimension ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EmployeeComparison {
  pub data: Vec<EmployeeChange>,
}

/// `GET /comparison/{year}/{month}/{expense_type}`
pub async fn by_type<S>(
  State(store): State<Arc<S>>,
  Path((year, month, expense_type)): Path<(i32, u32, String)>,
) -> Result<Json<EmployeeComparison>, ApiError>
where
  S: LedgerStore,
{
  let period = Period::new(year, month)?;
  let expense_type: ExpenseType = expense_type.parse()?;

  let data = match employee_comparison(store.as_ref(), period, expense_type).await {
    Ok(rows) => rows,
    Err(err) => {
      tracing::error!(%err, %period, %expense_type, "employee comparison failed");
      Vec::new()
    }
  };
  Ok(Json(EmployeeComparison { data }))
}
