//! `GET /summary[?year=&month=]`: per-period totals, newest first.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use payledger_core::{
  record::Period,
  report::PeriodSummary,
  store::{LedgerStore, PeriodFilter},
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
  pub year:  Option<i32>,
  pub month: Option<u32>,
}

/// Storage faults are logged and answered with an empty list.
pub async fn monthly<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SummaryParams>,
) -> Result<Json<Vec<PeriodSummary>>, ApiError>
where
  S: LedgerStore,
{
  if let Some(month) = params.month {
    Period::new(params.year.unwrap_or_default(), month)?;
  }

  let filter = PeriodFilter { year: params.year, month: params.month };
  let summary = match store.monthly_summary(filter).await {
    Ok(rows) => rows,
    Err(err) => {
      tracing::error!(%err, ?filter, "monthly summary failed");
      Vec::new()
    }
  };
  Ok(Json(summary))
}
