//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use hvp_core::{
  FIELDS, Sample,
  convert::convert,
  enums::{AnatomicalSite, SampleUse, StorageBuffer},
  schema::FieldKind,
  store::SampleStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn minimal(sample_id: &str) -> Sample {
  let mut sample = Sample::new(sample_id);
  sample.participant_id  = Some("p1".into());
  sample.anatomical_site = Some(AnatomicalSite::NpSwab);
  sample.date_collected  = NaiveDate::from_ymd_opt(2024, 4, 2);
  sample.storage_buffer  = Some(StorageBuffer::Neat);
  sample.sample_use      = Some(SampleUse::Experiment);
  sample
}

/// A raw value for every column: text columns get a distinct string, dates a
/// fixed day, enumerations their last member.
fn full_row() -> Vec<(&'static str, String)> {
  FIELDS
    .iter()
    .map(|def| {
      let raw = match def.kind {
        FieldKind::Text => format!("{}-value", def.name),
        FieldKind::Date => "2023-11-30".to_owned(),
        FieldKind::Enum(allowed) => allowed[allowed.len() - 1].to_owned(),
      };
      (def.name, raw)
    })
    .collect()
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_rows() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("hvp.db");

  let s = SqliteStore::open(&path).await.unwrap();
  s.insert_batch(vec![minimal("s1")]).await.unwrap();
  drop(s);

  let reopened = SqliteStore::open(&path).await.unwrap();
  assert_eq!(reopened.count_samples().await.unwrap(), 1);
}

// ─── Inserts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_batch_and_list_in_order() {
  let s = store().await;
  let n = s
    .insert_batch(vec![minimal("s2"), minimal("s1"), minimal("s3")])
    .await
    .unwrap();
  assert_eq!(n, 3);

  let ids: Vec<_> = s
    .list_samples()
    .await
    .unwrap()
    .into_iter()
    .map(|sample| sample.sample_id)
    .collect();
  assert_eq!(ids, ["s2", "s1", "s3"]);
}

#[tokio::test]
async fn every_column_round_trips() {
  let s = store().await;
  let raw = full_row();
  let converted = convert(raw.iter().map(|(k, v)| (*k, v.as_str())));
  assert!(converted.is_ok());
  let sample = Sample::from_converted(&converted).unwrap();

  s.insert_batch(vec![sample.clone()]).await.unwrap();
  let fetched = s.get_sample("sample_id-value").await.unwrap().unwrap();
  assert_eq!(fetched, sample);

  for (name, original) in &raw {
    let value = fetched.get(name).unwrap();
    assert_eq!(&value.to_string(), original, "column {name}");
  }
}

#[tokio::test]
async fn absent_columns_read_back_as_none() {
  let s = store().await;
  s.insert_batch(vec![Sample::new("bare")]).await.unwrap();

  let fetched = s.get_sample("bare").await.unwrap().unwrap();
  assert_eq!(fetched, Sample::new("bare"));
}

#[tokio::test]
async fn get_sample_missing_returns_none() {
  let s = store().await;
  assert!(s.get_sample("nope").await.unwrap().is_none());
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_key_in_batch_rolls_back_everything() {
  let s = store().await;
  let result = s
    .insert_batch(vec![minimal("s1"), minimal("s2"), minimal("s1")])
    .await;

  assert!(matches!(
    result,
    Err(Error::Constraint { ref sample_id, .. }) if sample_id == "s1"
  ));
  assert_eq!(s.count_samples().await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_of_stored_key_leaves_store_unchanged() {
  let s = store().await;
  s.insert_batch(vec![minimal("s1")]).await.unwrap();

  let result = s.insert_batch(vec![minimal("s2"), minimal("s1")]).await;
  assert!(matches!(result, Err(Error::Constraint { .. })));

  let ids: Vec<_> = s
    .list_samples()
    .await
    .unwrap()
    .into_iter()
    .map(|sample| sample.sample_id)
    .collect();
  assert_eq!(ids, ["s1"]);
}

#[tokio::test]
async fn unit_of_work_commits_through_store() {
  let s = store().await;
  let mut unit = s.unit_of_work();
  unit.add(minimal("a"));
  unit.add(minimal("b"));
  assert_eq!(s.count_samples().await.unwrap(), 0);

  assert_eq!(unit.commit().await.unwrap(), 2);
  assert_eq!(s.count_samples().await.unwrap(), 2);
}
