//! Shared-secret authentication.
//!
//! The secret is only ever held as an argon2 PHC hash. A successful login
//! yields a stateless session token
//!
//! ```text
//! base64url(issued_at ‖ nonce) "." hex(hmac_sha256(key, issued_at ‖ nonce))
//! ```
//!
//! where `key` is drawn from the OS RNG when the server starts, so a restart
//! invalidates every outstanding token. Tokens travel in the `hvp_session`
//! cookie or an `Authorization: Bearer` header and are checked per request by
//! [`require_page_session`] and [`require_api_session`].

use std::{
  sync::Arc,
  time::{Duration, SystemTime, UNIX_EPOCH},
};

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand_core::{OsRng, RngCore as _};
use sha2::Sha256;

use crate::{ServerConfig, error::Error};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "hvp_session";

const NONCE_LEN: usize = 16;
const PAYLOAD_LEN: usize = 8 + NONCE_LEN;

/// Characters escaped when a path is carried as the `next` query value.
const NEXT_VALUE: &AsciiSet =
  &NON_ALPHANUMERIC.remove(b'/').remove(b'-').remove(b'_').remove(b'.').remove(b'~');

type HmacSha256 = Hmac<Sha256>;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Credentials and signing key for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub session_ttl:   Duration,
  /// Keyed with random bytes drawn at start-up.
  signer:            HmacSha256,
}

/// Hash `secret` into an argon2 PHC string with a fresh salt.
pub fn hash_secret(secret: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(secret.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Config(format!("argon2 error: {e}")))
}

impl AuthConfig {
  /// Use an existing PHC hash. Fails if `password_hash` does not parse.
  pub fn from_hash(
    password_hash: impl Into<String>,
    session_ttl: Duration,
  ) -> Result<Self, Error> {
    let password_hash = password_hash.into();
    PasswordHash::new(&password_hash)
      .map_err(|e| Error::Config(format!("invalid shared_secret_hash: {e}")))?;

    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    let signer = HmacSha256::new_from_slice(&key)
      .map_err(|e| Error::Config(format!("session key: {e}")))?;
    Ok(Self { password_hash, session_ttl, signer })
  }

  /// Hash a plain secret and use it.
  pub fn from_secret(secret: &str, session_ttl: Duration) -> Result<Self, Error> {
    Self::from_hash(hash_secret(secret)?, session_ttl)
  }

  /// A configured hash wins over a plain secret. Having neither is an error.
  pub fn from_config(config: &ServerConfig) -> Result<Self, Error> {
    let ttl = Duration::from_secs(config.session_hours.saturating_mul(3600));
    match (&config.shared_secret_hash, &config.shared_secret) {
      (Some(hash), _) => Self::from_hash(hash.clone(), ttl),
      (None, Some(secret)) if !secret.is_empty() => Self::from_secret(secret, ttl),
      _ => Err(Error::Config("no shared secret configured".to_owned())),
    }
  }

  pub fn verify_password(&self, candidate: &str) -> bool {
    PasswordHash::new(&self.password_hash)
      .and_then(|parsed| {
        Argon2::default().verify_password(candidate.as_bytes(), &parsed)
      })
      .is_ok()
  }

  // ─── Tokens ────────────────────────────────────────────────────────────────

  fn sign(&self, payload: &[u8]) -> Vec<u8> {
    let mut mac = self.signer.clone();
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
  }

  pub fn issue_token(&self) -> String { self.issue_token_at(SystemTime::now()) }

  fn issue_token_at(&self, now: SystemTime) -> String {
    let mut payload = [0u8; PAYLOAD_LEN];
    payload[..8].copy_from_slice(&unix_secs(now).to_be_bytes());
    OsRng.fill_bytes(&mut payload[8..]);
    format!("{}.{}", B64.encode(payload), hex::encode(self.sign(&payload)))
  }

  pub fn verify_token(&self, token: &str) -> bool {
    self.verify_token_at(token, SystemTime::now())
  }

  fn verify_token_at(&self, token: &str, now: SystemTime) -> bool {
    let Some((payload, mac)) = token.split_once('.') else { return false };
    let (Ok(payload), Ok(mac)) = (B64.decode(payload), hex::decode(mac)) else {
      return false;
    };
    if payload.len() != PAYLOAD_LEN {
      return false;
    }
    let mut expected = self.signer.clone();
    expected.update(&payload);
    if expected.verify_slice(&mac).is_err() {
      return false;
    }

    let mut issued = [0u8; 8];
    issued.copy_from_slice(&payload[..8]);
    let age = unix_secs(now).saturating_sub(u64::from_be_bytes(issued));
    age <= self.session_ttl.as_secs()
  }

  /// `Set-Cookie` value carrying `token`.
  pub fn session_cookie(&self, token: &str) -> String {
    format!(
      "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
      self.session_ttl.as_secs()
    )
  }
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie() -> String {
  format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn unix_secs(t: SystemTime) -> u64 {
  t.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

// ─── Request checks ──────────────────────────────────────────────────────────

/// The session token presented by a request: a bearer token if there is one,
/// otherwise the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "));

  bearer.or_else(|| {
    headers
      .get_all(header::COOKIE)
      .iter()
      .filter_map(|v| v.to_str().ok())
      .flat_map(|v| v.split(';'))
      .filter_map(|pair| pair.trim().split_once('='))
      .find(|(name, _)| *name == SESSION_COOKIE)
      .map(|(_, value)| value)
  })
}

pub fn is_authenticated(headers: &HeaderMap, auth: &AuthConfig) -> bool {
  session_token(headers).is_some_and(|token| auth.verify_token(token))
}

/// `/login?next=<path and query>` for a request that needs a session.
pub fn login_redirect(uri: &axum::http::Uri) -> String {
  let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
  format!("/login?next={}", utf8_percent_encode(target, NEXT_VALUE))
}

/// Page middleware: unauthenticated requests are sent to the login page with
/// the original path and query as `next`.
pub async fn require_page_session(
  State(auth): State<Arc<AuthConfig>>,
  request: Request,
  next: Next,
) -> Response {
  if is_authenticated(request.headers(), &auth) {
    return next.run(request).await;
  }
  Redirect::to(&login_redirect(request.uri())).into_response()
}

/// API middleware: unauthenticated requests get `401` JSON.
pub async fn require_api_session(
  State(auth): State<Arc<AuthConfig>>,
  request: Request,
  next: Next,
) -> Result<Response, Error> {
  if is_authenticated(request.headers(), &auth) {
    Ok(next.run(request).await)
  } else {
    Err(Error::Unauthorized)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  const HOUR: Duration = Duration::from_secs(3600);

  fn config(secret: &str) -> AuthConfig { AuthConfig::from_secret(secret, HOUR).unwrap() }

  fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
      map.append(name.clone(), HeaderValue::from_str(value).unwrap());
    }
    map
  }

  #[test]
  fn password_verification() {
    let auth = config("hunter2");
    assert!(auth.verify_password("hunter2"));
    assert!(!auth.verify_password("hunter3"));
    assert!(!auth.verify_password(""));
  }

  #[test]
  fn issued_token_verifies() {
    let auth = config("s");
    let token = auth.issue_token();
    assert!(auth.verify_token(&token));
    assert_ne!(token, auth.issue_token());
  }

  #[test]
  fn tampered_tokens_are_rejected() {
    let auth = config("s");
    let token = auth.issue_token();
    let (payload, mac) = token.split_once('.').unwrap();

    let mut flipped = mac.to_owned();
    let last = if flipped.ends_with('0') { "1" } else { "0" };
    flipped.replace_range(flipped.len() - 1.., last);
    assert!(!auth.verify_token(&format!("{payload}.{flipped}")));

    let other = auth.issue_token();
    let (other_payload, _) = other.split_once('.').unwrap();
    assert!(!auth.verify_token(&format!("{other_payload}.{mac}")));

    assert!(!auth.verify_token(""));
    assert!(!auth.verify_token("no-dot"));
    assert!(!auth.verify_token("!!!.zz"));
  }

  #[test]
  fn tokens_do_not_survive_a_new_key() {
    let first = config("s");
    let second = AuthConfig::from_hash(first.password_hash.clone(), HOUR).unwrap();
    assert!(!second.verify_token(&first.issue_token()));
  }

  #[test]
  fn expired_tokens_are_rejected() {
    let auth = config("s");
    let now = SystemTime::now();
    let old = auth.issue_token_at(now - 2 * HOUR);
    assert!(!auth.verify_token_at(&old, now));
    let recent = auth.issue_token_at(now - HOUR / 2);
    assert!(auth.verify_token_at(&recent, now));
  }

  #[test]
  fn login_redirect_keeps_the_query() {
    let uri = |s: &str| s.parse::<axum::http::Uri>().unwrap();
    assert_eq!(login_redirect(&uri("/samples")), "/login?next=/samples");
    assert_eq!(
      login_redirect(&uri("/samples?site=np_swab&x=a%20b")),
      "/login?next=/samples%3Fsite%3Dnp_swab%26x%3Da%2520b"
    );
  }

  #[test]
  fn from_config_prefers_hash_and_requires_a_secret() {
    let mut cfg = ServerConfig::default();
    assert!(matches!(AuthConfig::from_config(&cfg), Err(Error::Config(_))));

    cfg.shared_secret = Some(String::new());
    assert!(AuthConfig::from_config(&cfg).is_err());

    cfg.shared_secret = Some("plain".into());
    assert!(AuthConfig::from_config(&cfg).unwrap().verify_password("plain"));

    cfg.shared_secret_hash = Some(hash_secret("hashed").unwrap());
    let auth = AuthConfig::from_config(&cfg).unwrap();
    assert!(auth.verify_password("hashed"));
    assert!(!auth.verify_password("plain"));

    cfg.shared_secret_hash = Some("not a phc string".into());
    assert!(AuthConfig::from_config(&cfg).is_err());
  }

  #[test]
  fn token_from_cookie_or_bearer() {
    let h = headers(&[(header::COOKIE, "theme=dark; hvp_session=abc.def; x=1")]);
    assert_eq!(session_token(&h), Some("abc.def"));

    let h = headers(&[
      (header::COOKIE, "hvp_session=from-cookie"),
      (header::AUTHORIZATION, "Bearer from-header"),
    ]);
    assert_eq!(session_token(&h), Some("from-header"));

    let h = headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
    assert_eq!(session_token(&h), None);
    assert_eq!(session_token(&HeaderMap::new()), None);
  }
}
