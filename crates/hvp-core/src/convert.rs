//! Row conversion: one untyped CSV row in, typed column values and
//! field-level errors out.
//!
//! The converter never fails. Every problem it finds is returned in
//! [`ConvertedRow::errors`], in the order the fields were encountered, so a
//! caller can report all of them at once.

use std::fmt;

use crate::schema::{self, FieldDef, FieldValue};

/// What went wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
  InvalidDate {
    value: String,
  },
  NotAllowed {
    value:   String,
    allowed: &'static [&'static str],
  },
  Missing,
}

/// A field-level problem, tied to the column it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
  pub field: String,
  pub kind:  FieldErrorKind,
}

impl FieldError {
  pub fn missing(field: &str) -> Self {
    Self { field: field.to_owned(), kind: FieldErrorKind::Missing }
  }
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      FieldErrorKind::InvalidDate { value } => {
        write!(f, "{}: invalid date {value}", self.field)
      }
      FieldErrorKind::NotAllowed { value, allowed } => {
        write!(f, "{}: {value} is not one of {}", self.field, allowed.join(", "))
      }
      FieldErrorKind::Missing => {
        write!(f, "{}: required field is missing", self.field)
      }
    }
  }
}

impl std::error::Error for FieldError {}

/// The result of converting one row.
#[derive(Debug, Clone, Default)]
pub struct ConvertedRow {
  /// Successfully converted schema columns, in input order.
  pub fields: Vec<(&'static FieldDef, FieldValue)>,
  /// Non-empty values of columns the schema does not define, untouched.
  pub extra:  Vec<(String, String)>,
  pub errors: Vec<FieldError>,
}

impl ConvertedRow {
  pub fn is_ok(&self) -> bool { self.errors.is_empty() }

  /// The converted value of column `name`, if present.
  pub fn value(&self, name: &str) -> Option<&FieldValue> {
    self
      .fields
      .iter()
      .find(|(def, _)| def.name == name)
      .map(|(_, value)| value)
  }
}

/// Convert one row of `(column, raw value)` pairs.
///
/// Empty values mean "unspecified" and are skipped without error, even for
/// required columns; required-ness is not checked here.
pub fn convert<'a, I>(row: I) -> ConvertedRow
where
  I: IntoIterator<Item = (&'a str, &'a str)>,
{
  let mut out = ConvertedRow::default();

  for (name, raw) in row {
    if raw.is_empty() {
      continue;
    }

    let Some(def) = schema::field(name) else {
      out.extra.push((name.to_owned(), raw.to_owned()));
      continue;
    };

    match def.kind.parse(raw) {
      Ok(value) => out.fields.push((def, value)),
      Err(kind) => out.errors.push(FieldError { field: name.to_owned(), kind }),
    }
  }

  out
}
