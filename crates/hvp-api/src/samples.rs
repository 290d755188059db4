//! Handlers for `/samples` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/samples` | Optional `?<column>=<value>` exact-match filters |
//! | `GET`  | `/samples/:id` | 404 if not found |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
};
use hvp_core::{Sample, schema, store::SampleStore};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// Keep the samples whose columns equal every filter value, compared in their
/// canonical text form (dates as `YYYY-MM-DD`).
fn apply_filters(
  samples: Vec<Sample>,
  filters: &BTreeMap<String, String>,
) -> Result<Vec<Sample>, ApiError> {
  if let Some(unknown) = filters.keys().find(|name| schema::field(name).is_none()) {
    return Err(ApiError::BadRequest(format!("unknown column {unknown}")));
  }

  Ok(
    samples
      .into_iter()
      .filter(|sample| {
        filters.iter().all(|(name, wanted)| {
          sample
            .get(name)
            .is_some_and(|value| value.to_string() == *wanted)
        })
      })
      .collect(),
  )
}

/// `GET /samples[?<column>=<value>...]`
///
/// Responds with a JSON array in insertion order. Absent columns serialise as
/// `null`.
pub async fn list<S: SampleStore>(
  State(store): State<Arc<S>>,
  Query(filters): Query<BTreeMap<String, String>>,
) -> Result<Json<Vec<Sample>>, ApiError> {
  let samples = store.list_samples().await.map_err(ApiError::store)?;
  Ok(Json(apply_filters(samples, &filters)?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /samples/:id`
pub async fn get_one<S: SampleStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Sample>, ApiError> {
  let sample = store
    .get_sample(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("sample {id} not found")))?;
  Ok(Json(sample))
}
