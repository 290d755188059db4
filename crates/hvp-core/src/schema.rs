//! The static record schema.
//!
//! Every column of a [`Sample`](crate::Sample) is described once, in
//! [`FIELDS`], by a [`FieldDef`]: its name, its semantic [`FieldKind`] and
//! whether it is required. The converter, the SQL mapping and the
//! serializers all read this table; nothing is discovered at runtime.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{FIELDS, convert::FieldErrorKind};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "allowed", rename_all = "snake_case")]
pub enum FieldKind {
  /// Free text, passed through unchanged.
  Text,
  /// An ISO-8601 calendar date (`YYYY-MM-DD`).
  Date,
  /// A closed enumeration; the value must match one member exactly.
  Enum(&'static [&'static str]),
}

impl FieldKind {
  /// The allowed members of an enumeration kind.
  pub fn allowed(&self) -> Option<&'static [&'static str]> {
    match *self {
      Self::Enum(allowed) => Some(allowed),
      _ => None,
    }
  }

  /// Parse a non-empty raw string into a typed value of this kind.
  pub fn parse(&self, raw: &str) -> Result<FieldValue, FieldErrorKind> {
    match *self {
      Self::Text => Ok(FieldValue::Text(raw.to_owned())),
      Self::Date => parse_iso_date(raw)
        .map(FieldValue::Date)
        .ok_or_else(|| FieldErrorKind::InvalidDate { value: raw.to_owned() }),
      Self::Enum(allowed) => allowed
        .iter()
        .copied()
        .find(|member| *member == raw)
        .map(FieldValue::Enum)
        .ok_or_else(|| FieldErrorKind::NotAllowed {
          value: raw.to_owned(),
          allowed,
        }),
    }
  }
}

/// Strict `YYYY-MM-DD`. chrono alone would also accept unpadded months and
/// days.
fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
  let bytes = raw.as_bytes();
  let shape_ok = bytes.len() == 10
    && bytes[4] == b'-'
    && bytes[7] == b'-'
    && bytes
      .iter()
      .enumerate()
      .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
  if !shape_ok {
    return None;
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

// ─── Definitions ─────────────────────────────────────────────────────────────

/// One column of the sample record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDef {
  pub name:     &'static str,
  pub kind:     FieldKind,
  pub required: bool,
}

/// Look up a column by name.
pub fn field(name: &str) -> Option<&'static FieldDef> {
  FIELDS.iter().find(|def| def.name == name)
}

/// All required columns, primary key first.
pub fn required_fields() -> impl Iterator<Item = &'static FieldDef> {
  FIELDS.iter().filter(|def| def.required)
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// A converted, typed column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
  Text(String),
  Date(NaiveDate),
  /// Always one of the members listed in the column's [`FieldKind::Enum`].
  Enum(&'static str),
}

impl FieldValue {
  pub fn kind_name(&self) -> &'static str {
    match self {
      Self::Text(_) => "text",
      Self::Date(_) => "date",
      Self::Enum(_) => "enum",
    }
  }
}

/// Canonical string form; dates render as `YYYY-MM-DD`.
impl fmt::Display for FieldValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Text(s) => f.write_str(s),
      Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
      Self::Enum(s) => f.write_str(s),
    }
  }
}

/// A Rust type that can back a column of the sample record.
pub trait FieldType: Sized {
  const KIND: FieldKind;

  fn from_value(value: FieldValue) -> Option<Self>;

  fn to_value(&self) -> FieldValue;
}

impl FieldType for String {
  const KIND: FieldKind = FieldKind::Text;

  fn from_value(value: FieldValue) -> Option<Self> {
    match value {
      FieldValue::Text(s) => Some(s),
      _ => None,
    }
  }

  fn to_value(&self) -> FieldValue { FieldValue::Text(self.clone()) }
}

impl FieldType for NaiveDate {
  const KIND: FieldKind = FieldKind::Date;

  fn from_value(value: FieldValue) -> Option<Self> {
    match value {
      FieldValue::Date(d) => Some(d),
      _ => None,
    }
  }

  fn to_value(&self) -> FieldValue { FieldValue::Date(*self) }
}
