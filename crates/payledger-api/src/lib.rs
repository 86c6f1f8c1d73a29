//! JSON reporting API for payledger.
//!
//! Exposes an axum [`Router`] backed by any
//! [`payledger_core::store::LedgerStore`]. Auth, TLS and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", payledger_api::api_router(store.clone()))
//! ```

pub mod comparison;
pub mod error;
pub mod imports;
pub mod records;
pub mod summary;

use std::sync::Arc;

use axum::{Router, routing::get};
use payledger_core::store::LedgerStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: LedgerStore + 'static,
{
  Router::new()
    // Reports
    .route("/summary", get(summary::monthly::<S>))
    .route("/comparison/{year}/{month}", get(comparison::period::<S>))
    .route("/comparison/{year}/{month}/{expense_type}", get(comparison::by_type::<S>))
    // Ledger
    .route("/records", get(records::list::<S>))
    .route("/imports", get(imports::history::<S>).post(imports::create::<S>))
    .with_state(store)
}
