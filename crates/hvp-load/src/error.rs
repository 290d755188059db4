//! Error types for the batch loader.

use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Every problem found on one line of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineErrors {
  /// Physical line number; the header is line 1.
  pub line:     u64,
  pub messages: Vec<String>,
}

impl fmt::Display for LineErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "line {}: {}", self.line, self.messages.join("; "))
  }
}

/// The aggregated result of validating a file that had at least one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchErrors {
  /// Data rows read, excluding the header.
  pub rows_read: usize,
  /// One entry per erroring line, in source order.
  pub lines:     Vec<LineErrors>,
}

impl BatchErrors {
  /// Data rows (not the header) that failed.
  pub fn rows_rejected(&self) -> usize {
    self.lines.iter().filter(|l| l.line > 1).count()
  }
}

impl fmt::Display for BatchErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "CSV validation failed ({} of {} rows rejected); nothing was loaded:",
      self.rows_rejected(),
      self.rows_read
    )?;
    for line in &self.lines {
      write!(f, "\n{line}")?;
    }
    Ok(())
  }
}

impl std::error::Error for BatchErrors {}

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("cannot read {}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("cannot read CSV input")]
  Read(#[source] std::io::Error),

  #[error("cannot read CSV header")]
  Header(#[source] csv::Error),

  #[error("{0}")]
  Validation(BatchErrors),

  /// Validation passed but the store refused the batch; nothing was written.
  #[error("store rejected the batch; nothing was loaded")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;
