//! Login, logout and token handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/login` | Optional `?next=<path>` |
//! | `POST` | `/login` | Form: `password`, `next`; sets the session cookie |
//! | `GET`  | `/logout` | Clears the session cookie |
//! | `POST` | `/token` | Body: `{"password":"…"}`; returns a bearer token |

use axum::{
  Form, Json,
  extract::{Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Redirect, Response},
};
use hvp_core::store::SampleStore;
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{clear_cookie, is_authenticated},
  error::Error,
  pages::login_page,
};

/// Only same-site relative paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
  match next {
    Some(path)
      if path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
        && !path.starts_with("/login") =>
    {
      path
    }
    _ => "/",
  }
}

// ─── Form login ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NextParam {
  pub next: Option<String>,
}

/// `GET /login[?next=<path>]`
pub async fn form<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<NextParam>,
  headers: HeaderMap,
) -> Response
where
  S: SampleStore + Clone + 'static,
{
  let next = safe_next(params.next.as_deref());
  if is_authenticated(&headers, &state.auth) {
    return Redirect::to(next).into_response();
  }
  login_page(None, next).into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
  pub password: String,
  #[serde(default)]
  pub next:     Option<String>,
}

/// `POST /login`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<LoginForm>,
) -> Response
where
  S: SampleStore + Clone + 'static,
{
  let next = safe_next(form.next.as_deref());
  if !state.auth.verify_password(&form.password) {
    tracing::warn!("failed login");
    return (
      StatusCode::UNAUTHORIZED,
      login_page(Some("Incorrect password"), next),
    )
      .into_response();
  }

  tracing::info!(next, "login");
  let cookie = state.auth.session_cookie(&state.auth.issue_token());
  ([(header::SET_COOKIE, cookie)], Redirect::to(next)).into_response()
}

/// `GET /logout`
pub async fn logout() -> Response {
  ([(header::SET_COOKIE, clear_cookie())], Redirect::to("/login")).into_response()
}

// ─── Bearer tokens ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
  pub token:      String,
  /// Seconds until the token stops being accepted.
  pub expires_in: u64,
}

/// `POST /token`
pub async fn token<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, Error>
where
  S: SampleStore + Clone + 'static,
{
  if !state.auth.verify_password(&body.password) {
    tracing::warn!("failed token request");
    return Err(Error::Unauthorized);
  }
  Ok(Json(TokenResponse {
    token:      state.auth.issue_token(),
    expires_in: state.auth.session_ttl.as_secs(),
  }))
}
