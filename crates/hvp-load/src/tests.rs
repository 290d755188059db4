//! Loader tests against an in-memory SQLite store.

use std::io::Write as _;

use hvp_core::{FIELDS, schema::FieldKind, store::SampleStore};
use hvp_store_sqlite::SqliteStore;

use crate::{LoadError, LoadOptions, load, load_reader, validate_reader};

const HEADER: &str = "sample_id,participant_id,anatomical_site,storage_buffer,sample_use";

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn csv(rows: &[&str]) -> String {
  let mut out = String::from(HEADER);
  for row in rows {
    out.push('\n');
    out.push_str(row);
  }
  out.push('\n');
  out
}

fn validation_message(result: Result<impl std::fmt::Debug, LoadError>) -> String {
  match result {
    Err(LoadError::Validation(batch)) => batch.to_string(),
    other => panic!("expected a validation failure, got {other:?}"),
  }
}

// ─── Reference scenarios ─────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_enums_on_two_lines_are_all_reported() {
  let s = store().await;
  let input = csv(&[
    "s1,p1,invalid_site,neat,experiment",
    "s2,p2,np_swab,invalid_buffer,invalid_use",
  ]);

  let message = validation_message(
    load_reader(input.as_bytes(), &s, &LoadOptions::default()).await,
  );

  assert!(message.contains("line 2") && message.contains("anatomical_site"), "{message}");
  assert!(message.contains("line 3") && message.contains("storage_buffer"), "{message}");
  assert!(message.contains("sample_use"), "{message}");
  assert_eq!(s.count_samples().await.unwrap(), 0);
}

#[tokio::test]
async fn corrected_file_loads_every_row() {
  let s = store().await;
  let input = csv(&[
    "s1,p1,np_swab,neat,experiment",
    "s2,p2,np_swab,pbs,pilot",
  ]);

  let report = load_reader(input.as_bytes(), &s, &LoadOptions::default())
    .await
    .unwrap();
  assert_eq!(report.rows_loaded, 2);

  let ids: Vec<_> = s
    .list_samples()
    .await
    .unwrap()
    .into_iter()
    .map(|sample| sample.sample_id)
    .collect();
  assert_eq!(ids, ["s1", "s2"]);

  // date_collected is required but absent from this file.
  assert_eq!(report.warnings, [
    "line 2: missing required field(s): date_collected",
    "line 3: missing required field(s): date_collected",
  ]);
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn every_error_is_reported_once_in_source_order() {
  let input = "sample_id,date_collected,anatomical_site,sample_use\n\
               s1,2024-01-01,np_swab,pilot\n\
               s2,2024-13-01,nose,pilot\n\
               s3,2024-01-03,stool,pilot\n\
               s4,yesterday,stool,Pilot\n";

  let err = validate_reader(input.as_bytes(), &LoadOptions::default()).unwrap_err();
  let LoadError::Validation(batch) = err else { panic!("expected validation failure") };

  assert_eq!(batch.rows_read, 4);
  assert_eq!(batch.rows_rejected(), 2);
  let lines: Vec<_> = batch.lines.iter().map(|l| l.line).collect();
  assert_eq!(lines, [3, 5]);
  assert_eq!(batch.lines[0].messages, [
    "date_collected: invalid date 2024-13-01",
    "anatomical_site: nose is not one of np_swab, buccal_swab, tongue_dorsum, saliva, \
     op_wash, dental_plaque, serum, whole_blood, periglottic, bal_a, bal_b, \
     bronch_prewash, endobronch_brush_l, endobronch_brush_r, stool",
  ]);
  assert_eq!(batch.lines[1].messages, [
    "date_collected: invalid date yesterday",
    "sample_use: Pilot is not one of experiment, pilot",
  ]);

  let message = batch.to_string();
  assert!(message.starts_with("CSV validation failed (2 of 4 rows rejected)"));
  assert_eq!(message.matches("line 3:").count(), 1);
  assert_eq!(message.matches("line 5:").count(), 1);
  assert!(message.find("line 3:").unwrap() < message.find("line 5:").unwrap());
  assert!(message.contains("\nline 5: date_collected: invalid date yesterday; sample_use:"));
}

#[tokio::test]
async fn one_bad_row_blocks_the_whole_batch() {
  let s = store().await;
  let mut rows = vec!["good1,p,stool,neat,pilot".to_owned()];
  rows.push("bad,p,stool,neat,nope".to_owned());
  rows.extend((2..50).map(|i| format!("good{i},p,stool,neat,pilot")));
  let refs: Vec<&str> = rows.iter().map(String::as_str).collect();

  let result = load_reader(csv(&refs).as_bytes(), &s, &LoadOptions::default()).await;
  assert!(matches!(result, Err(LoadError::Validation(_))));
  assert_eq!(s.count_samples().await.unwrap(), 0);
}

#[tokio::test]
async fn rejection_is_repeatable() {
  let s = store().await;
  let input = csv(&["s1,p1,x,y,z", "s2,p2,np_swab,neat,pilot", "s3,p3,a,b,c"]);

  let first = load_reader(input.as_bytes(), &s, &LoadOptions::default()).await;
  let second = load_reader(input.as_bytes(), &s, &LoadOptions::default()).await;
  match (first, second) {
    (Err(LoadError::Validation(a)), Err(LoadError::Validation(b))) => assert_eq!(a, b),
    other => panic!("expected two validation failures, got {other:?}"),
  }
}

// ─── Row-level checks ────────────────────────────────────────────────────────

#[tokio::test]
async fn enum_values_must_match_exactly() {
  for (value, ok) in [("pilot", true), ("PILOT", false), (" pilot", false), ("pilot ", false)] {
    let input = format!("sample_id,sample_use\ns1,{value}\n");
    let result = validate_reader(input.as_bytes(), &LoadOptions::default());
    assert_eq!(result.is_ok(), ok, "{value:?}");
    if !ok {
      assert!(validation_message(result).contains("is not one of experiment, pilot"));
    }
  }
}

#[tokio::test]
async fn strict_mode_rejects_missing_required_fields() {
  let input = csv(&["s1,p1,np_swab,,experiment"]);
  let message = validation_message(validate_reader(input.as_bytes(), &LoadOptions::strict()));
  assert!(
    message.contains(
      "line 2: date_collected: required field is missing; \
       storage_buffer: required field is missing"
    ),
    "{message}"
  );
}

#[tokio::test]
async fn missing_sample_id_is_always_an_error() {
  let input = csv(&[",p1,np_swab,neat,experiment"]);
  let message = validation_message(validate_reader(input.as_bytes(), &LoadOptions::default()));
  assert!(message.contains("line 2: sample_id: required field is missing"), "{message}");
}

#[tokio::test]
async fn duplicate_sample_ids_in_one_file_are_reported() {
  let input = csv(&[
    "s1,p1,np_swab,neat,experiment",
    "s2,p2,np_swab,neat,experiment",
    "s1,p3,np_swab,neat,experiment",
  ]);
  let message = validation_message(validate_reader(input.as_bytes(), &LoadOptions::default()));
  assert!(message.contains("line 4: sample_id: s1 duplicates line 2"), "{message}");
}

#[tokio::test]
async fn ragged_rows_are_reported_with_their_line() {
  let input = csv(&["s1,p1,np_swab,neat", "s2,p2,np_swab,neat,experiment"]);
  let message = validation_message(validate_reader(input.as_bytes(), &LoadOptions::default()));
  assert!(message.contains("line 2: expected 5 fields, found 4"), "{message}");
  assert!(!message.contains("line 3"), "{message}");
}

#[tokio::test]
async fn unknown_header_columns_are_reported_on_line_one() {
  let input = "sample_id,colour,sample_use\ns1,blue,nope\n";
  let message = validation_message(validate_reader(input.as_bytes(), &LoadOptions::default()));
  assert!(message.contains("\nline 1: unknown column colour"), "{message}");
  assert!(message.contains("\nline 2: sample_use: nope is not one of"), "{message}");
}

#[tokio::test]
async fn header_only_file_loads_nothing() {
  let s = store().await;
  let report = load_reader(format!("{HEADER}\n").as_bytes(), &s, &LoadOptions::default())
    .await
    .unwrap();
  assert_eq!(report.rows_loaded, 0);
  assert_eq!(s.count_samples().await.unwrap(), 0);
}

// ─── Line numbering ──────────────────────────────────────────────────────────

fn error_lines(input: &str) -> Vec<u64> {
  match validate_reader(input.as_bytes(), &LoadOptions::default()) {
    Err(LoadError::Validation(batch)) => batch.lines.iter().map(|l| l.line).collect(),
    other => panic!("expected a validation failure, got {other:?}"),
  }
}

#[test]
fn crlf_files_count_lines_like_lf_files() {
  let lf = "sample_id,sample_use\ns1,bad1\ns2,bad2\ns3,bad3\n";
  let crlf = lf.replace('\n', "\r\n");
  assert_eq!(error_lines(lf), [2, 3, 4]);
  assert_eq!(error_lines(&crlf), [2, 3, 4]);
}

#[test]
fn blank_lines_are_counted() {
  assert_eq!(error_lines("sample_id,sample_use\ns1,pilot\n\ns2,nope\n"), [4]);
  assert_eq!(
    error_lines("sample_id,sample_use\r\n\r\ns1,nope\r\n\r\n\r\ns2,nope\r\n"),
    [3, 6]
  );
}

#[test]
fn quoted_fields_spanning_lines_keep_later_numbers_accurate() {
  let input = "sample_id,sample_deviation,sample_use\n\
               s1,\"spilled\non the\nbench\",nope\n\
               s2,,pilot\n\
               s3,,nope\n";
  assert_eq!(error_lines(input), [2, 6]);
}

// ─── Files & persistence ─────────────────────────────────────────────────────

#[tokio::test]
async fn every_column_round_trips_through_a_file() {
  let s = store().await;
  let values: Vec<String> = FIELDS
    .iter()
    .map(|def| match def.kind {
      FieldKind::Text => format!("{}-x", def.name),
      FieldKind::Date => "2022-08-15".to_owned(),
      FieldKind::Enum(allowed) => allowed[0].to_owned(),
    })
    .collect();
  let header: Vec<_> = FIELDS.iter().map(|def| def.name).collect();

  let mut file = tempfile::NamedTempFile::new().unwrap();
  writeln!(file, "{}", header.join(",")).unwrap();
  writeln!(file, "{}", values.join(",")).unwrap();

  let report = load(file.path(), &s, &LoadOptions::strict()).await.unwrap();
  assert_eq!(report.rows_loaded, 1);
  assert!(report.warnings.is_empty());

  let stored = s.get_sample("sample_id-x").await.unwrap().unwrap();
  for (def, original) in FIELDS.iter().zip(&values) {
    assert_eq!(&stored.get(def.name).unwrap().to_string(), original, "{}", def.name);
  }
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
  let s = store().await;
  let result = load("/definitely/not/here.csv", &s, &LoadOptions::default()).await;
  assert!(matches!(result, Err(LoadError::Io { .. })));
}

#[tokio::test]
async fn store_rejection_leaves_store_unchanged() {
  let s = store().await;
  load_reader(csv(&["s1,p1,np_swab,neat,pilot"]).as_bytes(), &s, &LoadOptions::default())
    .await
    .unwrap();

  let input = csv(&["s2,p2,np_swab,neat,pilot", "s1,p1,np_swab,neat,pilot"]);
  let result = load_reader(input.as_bytes(), &s, &LoadOptions::default()).await;
  assert!(matches!(result, Err(LoadError::Store(_))));
  assert_eq!(s.count_samples().await.unwrap(), 1);
}
