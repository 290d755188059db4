//! Password-gated web view for the HVP sample registry.
//!
//! Exposes an axum [`Router`] serving a login page, an HTML sample table and
//! the read-only JSON API from `hvp-api` under `/api`, backed by any
//! [`SampleStore`]. Everything except `/login`, `/token` and `/health`
//! requires a session token; see [`auth`].

pub mod auth;
pub mod error;
pub mod login;
pub mod pages;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  middleware::from_fn_with_state,
  routing::{get, post},
};
use hvp_core::store::SampleStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `hvp.toml` and `HVP_*`
/// environment variables.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// The shared password in plain text. Hashed at startup.
  pub shared_secret:      Option<String>,
  /// An argon2 PHC string; takes precedence over `shared_secret`.
  pub shared_secret_hash: Option<String>,
  /// How long a login stays valid.
  pub session_hours:      u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "127.0.0.1".to_owned(),
      port:               8080,
      store_path:         PathBuf::from("hvp.db"),
      shared_secret:      None,
      shared_secret_hash: None,
      session_hours:      12,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SampleStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S: SampleStore> AppState<S> {
  /// Build state from `config`, failing if no shared secret is configured.
  pub fn new(store: S, config: &ServerConfig) -> Result<Self, Error> {
    let auth = AuthConfig::from_config(config)?;
    Ok(Self { store: Arc::new(store), auth: Arc::new(auth) })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// Build the axum [`Router`] for the web view.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SampleStore + Clone + 'static,
{
  let pages = Router::new()
    .route("/",        get(pages::index::<S>))
    .route("/samples", get(pages::samples::<S>))
    .route_layer(from_fn_with_state(
      state.auth.clone(),
      auth::require_page_session,
    ));

  let public = Router::new()
    .route("/login",  get(login::form::<S>).post(login::submit::<S>))
    .route("/logout", get(login::logout))
    .route("/token",  post(login::token::<S>))
    .route("/health", get(health));

  let api = hvp_api::api_router(state.store.clone()).route_layer(
    from_fn_with_state(state.auth.clone(), auth::require_api_session),
  );

  Router::new()
    .merge(pages)
    .merge(public)
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}
