//! `GET /records[?year=&month=]`: raw ledger rows ordered by period, then
//! employee id.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use payledger_core::{
  record::ExpenseRecord,
  store::{LedgerStore, PeriodFilter},
};

use crate::error::ApiError;

pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(filter): Query<PeriodFilter>,
) -> Result<Json<Vec<ExpenseRecord>>, ApiError>
where
  S: LedgerStore,
{
  let records = store.list_records(filter).await.map_err(ApiError::store)?;
  Ok(Json(records))
}
