//! Core types and trait definitions for the HVP sample registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The record shape, its static schema, the row converter and the
//! persistence gateway trait all live here; every other crate depends on it.

pub mod convert;
pub mod enums;
pub mod error;
pub mod sample;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use sample::{FIELDS, Sample};
