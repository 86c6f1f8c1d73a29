//! Error types for `payledger-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid employee id {0:?}: expected 1 to 5 ASCII letters or digits")]
  InvalidEmployeeId(String),

  #[error("invalid month {0}: expected 1-12")]
  InvalidMonth(u32),

  #[error("unknown expense type: {0:?}")]
  UnknownExpenseType(String),

  #[error("unknown import strategy: {0:?}")]
  UnknownStrategy(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
