//! SQL for the `samples` table, generated from the record descriptor.
//!
//! Executed once at connection startup. Every column is `TEXT`: dates are
//! stored as `YYYY-MM-DD`, enumerations as their wire spelling guarded by a
//! `CHECK` constraint.

use hvp_core::{FIELDS, Sample, schema::FieldKind};

pub const TABLE: &str = "samples";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub fn create_sql() -> String {
  let columns: Vec<String> = FIELDS
    .iter()
    .map(|def| {
      let mut col = format!("    {} TEXT", def.name);
      if def.name == Sample::KEY {
        col.push_str(" PRIMARY KEY NOT NULL");
      }
      if let FieldKind::Enum(allowed) = def.kind {
        let members: Vec<String> =
          allowed.iter().map(|m| format!("'{m}'")).collect();
        col.push_str(&format!(" CHECK ({} IN ({}))", def.name, members.join(", ")));
      }
      col
    })
    .collect();

  format!(
    "PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS {TABLE} (
{}
);

CREATE INDEX IF NOT EXISTS samples_participant_idx ON {TABLE}(participant_id);

PRAGMA user_version = 1;
",
    columns.join(",\n")
  )
}

fn column_list() -> String {
  FIELDS.iter().map(|def| def.name).collect::<Vec<_>>().join(", ")
}

pub fn insert_sql() -> String {
  let placeholders: Vec<String> =
    (1..=FIELDS.len()).map(|i| format!("?{i}")).collect();
  format!(
    "INSERT INTO {TABLE} ({}) VALUES ({})",
    column_list(),
    placeholders.join(", ")
  )
}

/// Rows come back in insertion order.
pub fn select_all_sql() -> String {
  format!("SELECT {} FROM {TABLE} ORDER BY rowid", column_list())
}

pub fn select_one_sql() -> String {
  format!("SELECT {} FROM {TABLE} WHERE {} = ?1", column_list(), Sample::KEY)
}

pub fn count_sql() -> String { format!("SELECT COUNT(*) FROM {TABLE}") }
