//! `GET /schema`: the static field descriptor as JSON.

use axum::Json;
use hvp_core::{FIELDS, schema::FieldDef};

pub async fn handler() -> Json<&'static [FieldDef]> { Json(FIELDS) }
