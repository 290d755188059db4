//! Validate-all-before-write batch loading.

use std::{
  collections::{HashMap, HashSet},
  fs,
  io::Read,
  path::Path,
};

use hvp_core::{
  Sample,
  convert::{FieldError, convert},
  schema,
  store::SampleStore,
};

use crate::error::{BatchErrors, LineErrors, LoadError, Result};

// ─── Options & results ───────────────────────────────────────────────────────

/// How to treat a row that leaves a required column empty.
///
/// A missing `sample_id` is always an error; this only governs the other
/// required columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequiredPolicy {
  /// Load the row and report the gap as a warning.
  #[default]
  Warn,
  /// Reject the row with a `required field is missing` error.
  Enforce,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
  pub required: RequiredPolicy,
}

impl LoadOptions {
  pub fn strict() -> Self { Self { required: RequiredPolicy::Enforce } }
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
  pub rows_loaded: usize,
  /// Non-fatal findings, one per affected line, in source order.
  pub warnings:    Vec<String>,
}

/// A fully validated file, ready to commit.
#[derive(Debug, Clone, Default)]
pub struct Validated {
  pub samples:  Vec<Sample>,
  pub warnings: Vec<String>,
}

// ─── Line numbers ────────────────────────────────────────────────────────────

/// Maps reader positions to 1-based physical line numbers.
///
/// A record's position is where the reader began looking for it, which can be
/// the blank lines or the `\n` of a CRLF terminator before the record itself.
struct LineIndex<'a> {
  input:    &'a [u8],
  newlines: Vec<usize>,
}

impl<'a> LineIndex<'a> {
  fn new(input: &'a [u8]) -> Self {
    let newlines = input
      .iter()
      .enumerate()
      .filter_map(|(i, &b)| (b == b'\n').then_some(i))
      .collect();
    Self { input, newlines }
  }

  fn line(&self, position: &csv::Position) -> u64 {
    let start = usize::try_from(position.byte()).unwrap_or(self.input.len());
    let skipped = self.input.get(start..).map_or(0, |rest| {
      rest.iter().take_while(|&&b| b == b'\r' || b == b'\n').count()
    });
    self.newlines.partition_point(|&nl| nl < start + skipped) as u64 + 1
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn header_problems(headers: &csv::StringRecord) -> Vec<String> {
  let mut seen = HashSet::new();
  let mut problems = Vec::new();
  for name in headers {
    if !seen.insert(name) {
      problems.push(format!("duplicate column {name}"));
    } else if schema::field(name).is_none() {
      problems.push(format!("unknown column {name}"));
    }
  }
  problems
}

/// Read and validate every row of `reader` without touching any store.
///
/// Returns every pending sample if the whole input is clean, or a
/// [`LoadError::Validation`] listing every problem in source order.
pub fn validate_reader<R: Read>(mut reader: R, options: &LoadOptions) -> Result<Validated> {
  let mut input = Vec::new();
  reader.read_to_end(&mut input).map_err(LoadError::Read)?;
  validate_bytes(&input, options)
}

fn validate_bytes(input: &[u8], options: &LoadOptions) -> Result<Validated> {
  let physical = LineIndex::new(input);
  let mut csv = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(input);

  let headers = csv.headers().map_err(LoadError::Header)?.clone();

  let mut lines: Vec<LineErrors> = Vec::new();
  let problems = header_problems(&headers);
  if !problems.is_empty() {
    lines.push(LineErrors { line: 1, messages: problems });
  }

  let mut validated = Validated::default();
  let mut first_seen: HashMap<String, u64> = HashMap::new();
  let mut rows_read = 0;

  for (index, result) in csv.records().enumerate() {
    rows_read += 1;
    let fallback_line = index as u64 + 2;

    let record = match result {
      Ok(record) => record,
      Err(e) => {
        let line = e.position().map_or(fallback_line, |p| physical.line(p));
        lines.push(LineErrors { line, messages: vec![e.to_string()] });
        continue;
      }
    };
    let line = record.position().map_or(fallback_line, |p| physical.line(p));

    if record.len() != headers.len() {
      lines.push(LineErrors {
        line,
        messages: vec![format!(
          "expected {} fields, found {}",
          headers.len(),
          record.len()
        )],
      });
      continue;
    }

    let converted = convert(headers.iter().zip(record.iter()));
    let mut messages: Vec<String> =
      converted.errors.iter().map(ToString::to_string).collect();

    match Sample::from_converted(&converted) {
      Ok(sample) => {
        if let Some(first) = first_seen.get(&sample.sample_id) {
          messages.push(format!(
            "{}: {} duplicates line {first}",
            Sample::KEY,
            sample.sample_id
          ));
        } else {
          first_seen.insert(sample.sample_id.clone(), line);
        }

        let missing = sample.missing_required();
        if options.required == RequiredPolicy::Enforce {
          messages.extend(
            missing.iter().map(|def| FieldError::missing(def.name).to_string()),
          );
        }

        if messages.is_empty() {
          if !missing.is_empty() {
            let names: Vec<_> = missing.iter().map(|def| def.name).collect();
            let warning = format!(
              "line {line}: missing required field(s): {}",
              names.join(", ")
            );
            tracing::warn!(line, sample_id = %sample.sample_id, "{warning}");
            validated.warnings.push(warning);
          }
          validated.samples.push(sample);
        }
      }
      Err(e) => messages.push(e.to_string()),
    }

    if !messages.is_empty() {
      lines.push(LineErrors { line, messages });
    }
  }

  if lines.is_empty() {
    Ok(validated)
  } else {
    Err(LoadError::Validation(BatchErrors { rows_read, lines }))
  }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Validate `reader` and, only if every row is clean, persist all rows in one
/// unit of work.
pub async fn load_reader<R, S>(
  reader: R,
  store: &S,
  options: &LoadOptions,
) -> Result<LoadReport>
where
  R: Read,
  S: SampleStore,
{
  let validated = match validate_reader(reader, options) {
    Ok(v) => v,
    Err(e) => {
      if let LoadError::Validation(batch) = &e {
        tracing::info!(
          rejected = batch.rows_rejected(),
          rows = batch.rows_read,
          "batch rejected"
        );
      }
      return Err(e);
    }
  };

  let mut unit = store.unit_of_work();
  for sample in validated.samples {
    unit.add(sample);
  }

  let rows_loaded = unit
    .commit()
    .await
    .map_err(|e| LoadError::Store(Box::new(e)))?;
  tracing::info!(rows = rows_loaded, "batch committed");

  Ok(LoadReport { rows_loaded, warnings: validated.warnings })
}

/// Load the CSV file at `path` into `store`.
pub async fn load<S: SampleStore>(
  path: impl AsRef<Path>,
  store: &S,
  options: &LoadOptions,
) -> Result<LoadReport> {
  let path = path.as_ref();
  tracing::info!(path = %path.display(), "loading samples");
  let input = fs::read(path).map_err(|source| LoadError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  load_reader(input.as_slice(), store, options).await
}
