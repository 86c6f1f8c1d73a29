//! Core types and trait definitions for the payledger expense ledger.
//!
//! This crate is free of spreadsheet, HTTP and database dependencies. It holds
//! the domain model, the salary backfill merge, the period comparison math and
//! the [`store::LedgerStore`] abstraction every backend implements.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod backfill;
pub mod compare;
pub mod error;
pub mod record;
pub mod report;
pub mod store;

pub use error::{Error, Result};
