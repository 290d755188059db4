//! Encoding and decoding between [`Sample`] and the plain-text column values
//! stored in SQLite.

use hvp_core::{
  FIELDS, Sample,
  convert::FieldError,
  schema::FieldValue,
};
use rusqlite::types::Value;

use crate::{Error, Result};

fn encode_value(value: Option<FieldValue>) -> Value {
  match value {
    Some(v) => Value::Text(v.to_string()),
    None => Value::Null,
  }
}

/// One SQL parameter per column, in [`FIELDS`] order.
pub fn encode_sample(sample: &Sample) -> Vec<Value> {
  sample.values().into_iter().map(encode_value).collect()
}

/// Raw strings read directly from a `samples` row, in [`FIELDS`] order.
pub struct RawSample(pub Vec<Option<String>>);

impl RawSample {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    (0..FIELDS.len())
      .map(|i| row.get::<_, Option<String>>(i))
      .collect::<rusqlite::Result<Vec<_>>>()
      .map(Self)
  }

  pub fn into_sample(self) -> Result<Sample> {
    let mut columns = FIELDS.iter().zip(self.0);

    let key = match columns.next() {
      Some((_, Some(key))) => key,
      _ => {
        return Err(Error::Decode {
          column:  Sample::KEY,
          message: "primary key is null".to_owned(),
        });
      }
    };

    let mut sample = Sample::new(key);
    for (def, raw) in columns {
      let Some(raw) = raw else { continue };
      let value = def.kind.parse(&raw).map_err(|kind| Error::Decode {
        column:  def.name,
        message: FieldError { field: def.name.to_owned(), kind }.to_string(),
      })?;
      sample.set(def.name, value)?;
    }
    Ok(sample)
  }
}
