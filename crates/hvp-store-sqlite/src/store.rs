//! [`SqliteStore`], the SQLite implementation of [`SampleStore`].

use std::path::Path;

use hvp_core::{Sample, store::SampleStore};
use rusqlite::{ErrorCode, OptionalExtension as _};

use crate::{
  Error, Result,
  encode::{RawSample, encode_sample},
  schema::{count_sql, create_sql, insert_sql, select_all_sql, select_one_sql},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A sample registry backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and create the schema if absent.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    tracing::debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let sql = create_sql();
    self
      .conn
      .call(move |conn| {
        tracing::debug!(%sql, "executing schema");
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
  )
}

// ─── SampleStore impl ────────────────────────────────────────────────────────

impl SampleStore for SqliteStore {
  type Error = Error;

  async fn insert_batch(&self, samples: Vec<Sample>) -> Result<usize> {
    let rows: Vec<(String, Vec<rusqlite::types::Value>)> = samples
      .iter()
      .map(|s| (s.sample_id.clone(), encode_sample(s)))
      .collect();
    let sql = insert_sql();

    // The inner result carries a constraint violation out of the closure
    // with the offending key attached.
    let outcome: std::result::Result<usize, (String, String)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(&sql)?;
          for (sample_id, values) in &rows {
            tracing::debug!(%sql, %sample_id, "insert");
            if let Err(e) = stmt.execute(rusqlite::params_from_iter(values.iter())) {
              if is_constraint_violation(&e) {
                return Ok(Err((sample_id.clone(), e.to_string())));
              }
              return Err(e.into());
            }
          }
        }
        tx.commit()?;
        Ok(Ok(rows.len()))
      })
      .await?;

    match outcome {
      Ok(n) => {
        tracing::debug!(rows = n, "batch committed");
        Ok(n)
      }
      Err((sample_id, message)) => {
        tracing::debug!(%sample_id, "batch rolled back");
        Err(Error::Constraint { sample_id, message })
      }
    }
  }

  async fn list_samples(&self) -> Result<Vec<Sample>> {
    let sql = select_all_sql();

    let raws: Vec<RawSample> = self
      .conn
      .call(move |conn| {
        tracing::debug!(%sql, "query");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawSample::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSample::into_sample).collect()
  }

  async fn get_sample(&self, sample_id: &str) -> Result<Option<Sample>> {
    let sql = select_one_sql();
    let id = sample_id.to_owned();

    let raw: Option<RawSample> = self
      .conn
      .call(move |conn| {
        tracing::debug!(%sql, sample_id = %id, "query");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], RawSample::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSample::into_sample).transpose()
  }

  async fn count_samples(&self) -> Result<usize> {
    let sql = count_sql();

    let count: i64 = self
      .conn
      .call(move |conn| {
        tracing::debug!(%sql, "query");
        Ok(conn.query_row(&sql, [], |row| row.get(0))?)
      })
      .await?;

    Ok(usize::try_from(count).unwrap_or_default())
  }
}
