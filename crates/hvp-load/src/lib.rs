//! CSV batch loader for the HVP sample registry.
//!
//! Reads a header-driven CSV file, converts and validates every row against
//! the record schema, and either rejects the whole file with one aggregated
//! report or commits every row in a single unit of work.
//!
//! # Quick start
//!
//! ```no_run
//! # async fn run(store: &impl hvp_core::store::SampleStore) -> Result<(), hvp_load::LoadError> {
//! let report = hvp_load::load("samples.csv", store, &hvp_load::LoadOptions::default()).await?;
//! println!("{} rows loaded", report.rows_loaded);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod loader;

pub use error::{BatchErrors, LineErrors, LoadError};
pub use loader::{
  LoadOptions, LoadReport, RequiredPolicy, Validated, load, load_reader,
  validate_reader,
};

#[cfg(test)]
mod tests;
