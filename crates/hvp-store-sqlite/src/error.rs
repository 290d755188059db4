//! Error type for `hvp-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] hvp_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A uniqueness or check constraint rejected a row; the whole batch was
  /// rolled back.
  #[error("sample {sample_id} rejected by the store: {message}")]
  Constraint {
    sample_id: String,
    message:   String,
  },

  #[error("column {column} holds an unreadable value: {message}")]
  Decode {
    column:  &'static str,
    message: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
