//! The `SampleStore` gateway trait and the [`UnitOfWork`] built on it.
//!
//! The trait is implemented by storage backends (e.g. `hvp-store-sqlite`).
//! The loader and the web layer depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::sample::Sample;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a sample registry backend.
///
/// Samples are only ever inserted; there is no update or delete.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SampleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist every sample in one transaction. Either all of them become
  /// visible to subsequent reads or none do. Returns the number inserted.
  fn insert_batch(
    &self,
    samples: Vec<Sample>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// All stored samples, in insertion order.
  fn list_samples(
    &self,
  ) -> impl Future<Output = Result<Vec<Sample>, Self::Error>> + Send + '_;

  /// Retrieve a sample by key. Returns `None` if not found.
  fn get_sample<'a>(
    &'a self,
    sample_id: &'a str,
  ) -> impl Future<Output = Result<Option<Sample>, Self::Error>> + Send + 'a;

  fn count_samples(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Open a unit of work against this store.
  fn unit_of_work(&self) -> UnitOfWork<'_, Self>
  where
    Self: Sized,
  {
    UnitOfWork::new(self)
  }
}

// ─── Unit of work ────────────────────────────────────────────────────────────

/// A transactional boundary: samples are buffered by [`add`](Self::add) and
/// written together by [`commit`](Self::commit).
///
/// Dropping a unit without committing discards its buffer.
#[must_use = "a unit of work does nothing until it is committed"]
pub struct UnitOfWork<'s, S: SampleStore> {
  store:   &'s S,
  pending: Vec<Sample>,
}

impl<'s, S: SampleStore> UnitOfWork<'s, S> {
  pub fn new(store: &'s S) -> Self {
    Self { store, pending: Vec::new() }
  }

  /// Buffer a sample. Nothing is written until [`commit`](Self::commit).
  pub fn add(&mut self, sample: Sample) { self.pending.push(sample); }

  /// Write every buffered sample atomically. On error nothing is written.
  pub async fn commit(self) -> Result<usize, S::Error> {
    if self.pending.is_empty() {
      return Ok(0);
    }
    self.store.insert_batch(self.pending).await
  }

  /// Discard the buffer, returning how many samples were dropped.
  pub fn rollback(self) -> usize { self.pending.len() }
}
