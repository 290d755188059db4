//! JSON REST API for the HVP sample registry.
//!
//! Exposes an axum [`Router`] backed by any [`hvp_core::store::SampleStore`].
//! The API is read-only. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", hvp_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod samples;
pub mod schema;

use std::sync::Arc;

use axum::{Router, routing::get};
use hvp_core::store::SampleStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SampleStore + 'static,
{
  Router::new()
    .route("/samples", get(samples::list::<S>))
    .route("/samples/{id}", get(samples::get_one::<S>))
    .route("/schema", get(schema::handler))
    .with_state(store)
}
