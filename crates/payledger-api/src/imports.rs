//! Handlers for `/imports` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/imports` | Import history, newest first |
//! | `POST` | `/imports` | Body: `{"strategy":"upsert","source":"…","records":[…]}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use payledger_core::{
  record::ExpenseRecord,
  store::{ImportBatch, ImportReceipt, ImportStrategy, LedgerStore},
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── History ─────────────────────────────────────────────────────────────────

/// `GET /imports`
pub async fn history<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<ImportReceipt>>, ApiError>
where
  S: LedgerStore,
{
  let imports = store.list_imports().await.map_err(ApiError::store)?;
  Ok(Json(imports))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ImportBody {
  pub strategy: ImportStrategy,
  pub source:   Option<String>,
  pub records:  Vec<ExpenseRecord>,
}

/// `POST /imports`; 201 with the receipt.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ImportBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LedgerStore,
{
  if body.records.is_empty() {
    return Err(ApiError::BadRequest("no records to import".to_owned()));
  }
  for record in &body.records {
    record.validate()?;
  }

  let mut batch = ImportBatch::new(body.records);
  batch.source = body.source;

  tracing::info!(strategy = %body.strategy, records = batch.records.len(), "import requested");
  let receipt = store
    .import(batch, body.strategy)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(receipt)))
}
