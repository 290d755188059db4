//! Error types for `hvp-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown field: {0}")]
  UnknownField(String),

  #[error("field {field} does not accept a {given} value")]
  FieldType {
    field: String,
    given: &'static str,
  },

  #[error("{value} is not a valid {kind}")]
  UnknownVariant {
    kind:  &'static str,
    value: String,
  },

  #[error("sample_id: required field is missing")]
  MissingKey,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
