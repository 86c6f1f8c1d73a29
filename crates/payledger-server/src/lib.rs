//! HTTP assembly for payledger.
//!
//! Mounts the JSON reporting API under `/api`, adds a liveness check and
//! request tracing, and holds the server configuration type.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use payledger_core::store::LedgerStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PAYLEDGER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("payledger.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: LedgerStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", payledger_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use payledger_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    router(Arc::new(store))
  }

  async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn import(app: &Router, strategy: &str, records: Value) -> Response {
    send(app, "POST", "/api/imports", Some(json!({
      "strategy": strategy,
      "source":   "test",
      "records":  records,
    })))
    .await
  }

  #[test]
  fn config_defaults() {
    let cfg = ServerConfig::default();
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("payledger.db"));
  }

  #[tokio::test]
  async fn health_is_ok() {
    let app = app().await;
    let resp = send(&app, "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  // ── Imports ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn import_returns_receipt_and_is_listed() {
    let app = app().await;
    let resp = import(&app, "replace", json!([
      { "emp_id": "1", "year": 2024, "month": 1, "SAL": 1000.0 },
    ]))
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let receipt = json_body(resp).await;
    assert_eq!(receipt["written"], 1);
    assert_eq!(receipt["strategy"], "replace");

    let history = json_body(send(&app, "GET", "/api/imports", None).await).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["import_id"], receipt["import_id"]);

    let records = json_body(send(&app, "GET", "/api/records?year=2024", None).await).await;
    assert_eq!(records[0]["emp_id"], "00001");
  }

  #[tokio::test]
  async fn import_rejects_invalid_and_empty_batches() {
    let app = app().await;

    let resp = import(&app, "upsert", json!([])).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = import(&app, "upsert", json!([
      { "emp_id": "1", "year": 2024, "month": 13 },
    ]))
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn append_only_duplicate_fails_without_changes() {
    let app = app().await;
    let row = json!({ "emp_id": "1", "year": 2024, "month": 1, "SAL": 10.0 });
    import(&app, "append_only", json!([row])).await;

    let resp = import(&app, "append_only", json!([row])).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let records = json_body(send(&app, "GET", "/api/records", None).await).await;
    assert_eq!(records.as_array().unwrap().len(), 1);
  }

  // ── Reports ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn summary_sums_one_period() {
    let app = app().await;
    import(&app, "replace", json!([
      { "emp_id": "1", "year": 2024, "month": 1, "SAL": 1000.0, "HF": 120.0 },
      { "emp_id": "2", "year": 2024, "month": 1, "SAL": 2000.0, "HF": 240.0 },
    ]))
    .await;

    let resp = send(&app, "GET", "/api/summary?year=2024&month=1", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let summary = json_body(resp).await;
    assert_eq!(summary.as_array().unwrap().len(), 1);
    assert_eq!(summary[0]["total_salary"], 3000.0);
    assert_eq!(summary[0]["total_housing_fund"], 360.0);
  }

  #[tokio::test]
  async fn summary_rejects_invalid_month() {
    let app = app().await;
    let resp = send(&app, "GET", "/api/summary?month=0", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn comparison_of_new_employee() {
    let app = app().await;
    import(&app, "replace", json!([
      { "emp_id": "1", "year": 2024, "month": 2, "SAL": 5000.0 },
    ]))
    .await;

    let cmp = json_body(send(&app, "GET", "/api/comparison/2024/2", None).await).await;
    assert_eq!(cmp["previous_period"], json!({ "year": 2024, "month": 1 }));
    assert_eq!(cmp["rows"][0]["emp_id"], "00001");
    assert_eq!(cmp["rows"][0]["salary"]["change"], 5000.0);
    assert_eq!(cmp["rows"][0]["salary"]["change_rate"], 100.0);
    assert_eq!(cmp["totals"]["salary"]["current"], 5000.0);
  }

  #[tokio::test]
  async fn comparison_of_empty_period_has_zero_totals() {
    let app = app().await;
    let resp = send(&app, "GET", "/api/comparison/2024/1", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cmp = json_body(resp).await;
    assert_eq!(cmp["previous_period"], json!({ "year": 2023, "month": 12 }));
    assert!(cmp["rows"].as_array().unwrap().is_empty());
    assert_eq!(cmp["totals"]["total"]["change_rate"], 0.0);
  }

  #[tokio::test]
  async fn comparison_by_type() {
    let app = app().await;
    import(&app, "replace", json!([
      { "emp_id": "1", "year": 2023, "month": 12, "HF": 100.0 },
      { "emp_id": "1", "year": 2024, "month": 1,  "HF": 150.0 },
    ]))
    .await;

    let resp = send(&app, "GET", "/api/comparison/2024/1/housing_fund", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["data"][0]["current"], 150.0);
    assert_eq!(body["data"][0]["previous"], 100.0);
    assert_eq!(body["data"][0]["change_rate"], 50.0);
  }

  #[tokio::test]
  async fn comparison_rejects_bad_input() {
    let app = app().await;

    let resp = send(&app, "GET", "/api/comparison/2024/1/bonus", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&app, "GET", "/api/comparison/2024/13", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}
