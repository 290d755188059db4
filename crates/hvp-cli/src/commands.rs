//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use hvp_core::store::SampleStore as _;
use hvp_load::{LoadOptions, LoadReport};
use hvp_store_sqlite::SqliteStore;
use hvp_web::{AppState, ServerConfig};
use tokio::net::TcpListener;

// ─── Store locations ──────────────────────────────────────────────────────────

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

/// Resolve a store location: a file path, or a `sqlite:///<path>` URL
/// (`sqlite:////abs/path` for an absolute path).
pub fn store_path(location: &str) -> Result<PathBuf> {
  let path = match location.strip_prefix("sqlite:///") {
    Some(path) => path,
    None if location.contains("://") => {
      bail!("unsupported store URL {location}; expected a file path or sqlite:///<path>")
    }
    None => location,
  };
  if path.is_empty() {
    bail!("empty store location");
  }
  Ok(expand_tilde(Path::new(path)))
}

async fn open_store(location: &str) -> Result<SqliteStore> {
  let path = store_path(location)?;
  SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {}", path.display()))
}

/// Render an error and its causes on one line, skipping a cause when the
/// message just above it already ends with the same text.
pub fn report(e: &anyhow::Error) -> String {
  let mut out = String::new();
  let mut previous = String::new();
  for cause in e.chain() {
    let text = cause.to_string();
    if previous.is_empty() || !previous.ends_with(&text) {
      if !out.is_empty() {
        out.push_str(": ");
      }
      out.push_str(&text);
    }
    previous = text;
  }
  out
}

// ─── init / load ──────────────────────────────────────────────────────────────

pub async fn init(location: &str) -> Result<()> {
  let store = open_store(location).await?;
  let count = store.count_samples().await?;
  tracing::info!(location, samples = count, "store ready");
  println!("{location}: ready ({count} samples)");
  Ok(())
}

pub async fn load(location: &str, csv: &Path, strict: bool) -> Result<LoadReport> {
  let store = open_store(location).await?;
  let options = if strict { LoadOptions::strict() } else { LoadOptions::default() };

  let report = hvp_load::load(csv, &store, &options).await?;
  match report.warnings.len() {
    0 => println!("loaded {} samples", report.rows_loaded),
    n => println!("loaded {} samples ({n} warnings)", report.rows_loaded),
  }
  Ok(report)
}

// ─── serve ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ServeArgs {
  pub store:  Option<String>,
  pub secret: Option<String>,
  pub config: PathBuf,
  pub host:   Option<String>,
  pub port:   Option<u16>,
}

/// Layer the config file, `HVP_*` environment variables and command-line
/// arguments, later sources winning.
pub fn server_config(args: &ServeArgs) -> Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(args.config.as_path()).required(false))
    .add_source(config::Environment::with_prefix("HVP").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let mut cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  cfg.store_path = match &args.store {
    Some(location) => store_path(location)?,
    None => expand_tilde(&cfg.store_path),
  };
  if let Some(secret) = &args.secret {
    cfg.shared_secret = Some(secret.clone());
  }
  if let Some(host) = &args.host {
    cfg.host = host.clone();
  }
  if let Some(port) = args.port {
    cfg.port = port;
  }
  Ok(cfg)
}

pub async fn serve(args: ServeArgs) -> Result<()> {
  let cfg = server_config(&args)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {}", cfg.store_path.display()))?;

  let address = format!("{}:{}", cfg.host, cfg.port);
  let state = AppState::new(store, &cfg).context("invalid server configuration")?;
  let app = hvp_web::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

// ─── hash-secret ──────────────────────────────────────────────────────────────

/// Read one line from stdin and print its PHC hash. The line is echoed when
/// typed at a terminal; pipe the secret in to keep it off screen.
pub fn hash_secret() -> Result<()> {
  use std::io::{self, BufRead, Write};
  eprint!("Secret: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;

  let secret = line.trim_end_matches('\n').trim_end_matches('\r');
  if secret.is_empty() {
    bail!("empty secret");
  }
  println!("{}", hvp_web::auth::hash_secret(secret)?);
  Ok(())
}
