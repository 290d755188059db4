//! `hvp`: command-line interface for the HVP sample registry.
//!
//! # Usage
//!
//! ```text
//! hvp init hvp.db
//! hvp load hvp.db samples.csv [--strict]
//! hvp serve hvp.db [SECRET] [--config hvp.toml] [--host 0.0.0.0] [--port 8080]
//! hvp hash-secret < secret.txt
//! ```
//!
//! Store locations are file paths or `sqlite:///path` URLs.

mod commands;

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::ServeArgs;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "hvp", version, about = "HVP lab sample registry")]
struct Args {
  /// Log every SQL statement sent to the store.
  #[arg(long, global = true)]
  echo: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create the sample table if it does not exist.
  Init {
    /// Database file or `sqlite:///` URL.
    store: String,
  },

  /// Validate a CSV file and load all of its rows, or none of them.
  #[command(alias = "load-csv")]
  Load {
    /// Database file or `sqlite:///` URL.
    store: String,
    /// CSV file with a header line of column names.
    csv:   PathBuf,
    /// Reject rows that leave a required column empty.
    #[arg(long)]
    strict: bool,
  },

  /// Serve the password-gated web view.
  Serve {
    /// Database file or `sqlite:///` URL; overrides `store_path`.
    #[arg(env = "HVP_DB_URI")]
    store:  Option<String>,
    /// Shared password; overrides `shared_secret`.
    #[arg(env = "HVP_SHARED_SECRET", hide_env_values = true)]
    secret: Option<String>,
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "hvp.toml")]
    config: PathBuf,
    #[arg(long)]
    host:   Option<String>,
    #[arg(long)]
    port:   Option<u16>,
  },

  /// Print the argon2 hash of a secret read from stdin, for
  /// `shared_secret_hash`.
  HashSecret,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn init_tracing(echo: bool) {
  let mut filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  if echo && let Ok(directive) = "hvp_store_sqlite=debug".parse() {
    filter = filter.add_directive(directive);
  }

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

#[tokio::main]
async fn main() -> ExitCode {
  let args = Args::parse();
  init_tracing(args.echo);

  let result = match args.command {
    Command::Init { store } => commands::init(&store).await,
    Command::Load { store, csv, strict } => {
      commands::load(&store, &csv, strict).await.map(|_| ())
    }
    Command::Serve { store, secret, config, host, port } => {
      commands::serve(ServeArgs { store, secret, config, host, port }).await
    }
    Command::HashSecret => commands::hash_secret(),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {}", commands::report(&e));
      ExitCode::FAILURE
    }
  }
}
