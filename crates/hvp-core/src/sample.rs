//! The `Sample` record: one row per biological sample.
//!
//! The struct and the [`FIELDS`] descriptor are generated from the same
//! table below, so a column cannot exist in one and not the other.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  convert::ConvertedRow,
  enums::{
    AmplifiedType, AnatomicalSite, BarcodeSet, DnaExtractionType,
    ExtractionType, LabOrigin, LibraryType, PrepType, RnaExtractionType,
    SampleUse, SequenceGroup, SequencePlatform, StorageBuffer,
  },
  schema::{self, FieldDef, FieldKind, FieldType, FieldValue},
};

macro_rules! sample_record {
  (@required) => { false };
  (@required required) => { true };

  (
    $(#[$meta:meta])*
    pub struct $name:ident {
      key $key:ident;
      $( $field:ident : $ty:ty $(, $req:ident)? ; )*
    }
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct $name {
      pub $key: String,
      $( pub $field: Option<$ty>, )*
    }

    /// Every column of the record in declaration order, primary key first.
    pub const FIELDS: &[FieldDef] = &[
      FieldDef { name: stringify!($key), kind: FieldKind::Text, required: true },
      $(
        FieldDef {
          name:     stringify!($field),
          kind:     <$ty as FieldType>::KIND,
          required: sample_record!(@required $($req)?),
        },
      )*
    ];

    impl $name {
      /// Name of the primary-key column.
      pub const KEY: &'static str = stringify!($key);

      /// A record with only its key set.
      pub fn new(key: impl Into<String>) -> Self {
        Self {
          $key: key.into(),
          $( $field: None, )*
        }
      }

      /// The typed value of column `name`, or `None` if unset or unknown.
      pub fn get(&self, name: &str) -> Option<FieldValue> {
        match name {
          stringify!($key) => Some(FieldValue::Text(self.$key.clone())),
          $( stringify!($field) => self.$field.as_ref().map(FieldType::to_value), )*
          _ => None,
        }
      }

      /// Assign column `name`. The value must be of the column's kind.
      pub fn set(&mut self, name: &str, value: FieldValue) -> Result<()> {
        let given = value.kind_name();
        let mismatch = || Error::FieldType { field: name.to_owned(), given };
        match name {
          stringify!($key) => {
            self.$key = String::from_value(value).ok_or_else(mismatch)?;
          }
          $(
            stringify!($field) => {
              self.$field =
                Some(<$ty as FieldType>::from_value(value).ok_or_else(mismatch)?);
            }
          )*
          _ => return Err(Error::UnknownField(name.to_owned())),
        }
        Ok(())
      }
    }
  };
}

sample_record! {
  /// The processing history of one sample, from collection to sequencing.
  ///
  /// Every column except the key is optional at the type level; which
  /// columns must be present is described by [`FieldDef::required`].
  pub struct Sample {
    key sample_id;

    // ── Identity & provenance ──────────────────────────────────────────────
    sample_id_alias:   String;
    participant_id:    String, required;
    anatomical_site:   AnatomicalSite, required;
    lab_origin:        LabOrigin;
    date_collected:    NaiveDate, required;
    date_hvp_custody:  NaiveDate;
    storage_buffer:    StorageBuffer, required;

    // ── Raw material ───────────────────────────────────────────────────────
    raw_consumed_date:       NaiveDate;
    raw_location_box:        String;
    raw_location_plate:      String;
    raw_location_plate_pos:  String;

    // ── Prep ───────────────────────────────────────────────────────────────
    prep_type:                PrepType;
    prep_date:                NaiveDate;
    prep_person:              String;
    prep_consumed_date:       NaiveDate;
    prep_location_box:        String;
    prep_location_plate:      String;
    prep_location_plate_pos:  String;

    // ── Extraction ─────────────────────────────────────────────────────────
    extraction_type:                ExtractionType;
    extraction_person:              String;
    extraction_consumed_date:       NaiveDate;
    extraction_location_box:        String;
    extraction_location_plate:      String;
    extraction_location_plate_pos:  String;

    extraction_rna_type:                RnaExtractionType;
    extraction_rna_person:              String;
    extraction_rna_consumed_date:       NaiveDate;
    extraction_rna_location_box:        String;
    extraction_rna_location_plate:      String;
    extraction_rna_location_plate_pos:  String;

    extraction_dna_type:                DnaExtractionType;
    extraction_dna_person:              String;
    extraction_dna_consumed_date:       NaiveDate;
    extraction_dna_location_box:        String;
    extraction_dna_location_plate:      String;
    extraction_dna_location_plate_pos:  String;

    // ── Amplification ──────────────────────────────────────────────────────
    amplified_type:                AmplifiedType;
    amplified_person:              String;
    amplified_consumed_date:       NaiveDate;
    amplified_location_box:        String;
    amplified_location_plate:      String;
    amplified_location_plate_pos:  String;

    // ── Library ────────────────────────────────────────────────────────────
    library_type:                LibraryType;
    library_date:                NaiveDate;
    library_person:              String;
    library_consumed_date:       NaiveDate;
    library_location_box:        String;
    library_location_plate:      String;
    library_location_plate_pos:  String;
    library_barcode_set:         BarcodeSet;
    library_barcode_position:    String;
    library_barcode_i5:          String;
    library_barcode_i7:          String;

    // ── Sequencing ─────────────────────────────────────────────────────────
    sample_use:          SampleUse, required;
    date_sequenced:      NaiveDate;
    sequence_platform:   SequencePlatform;
    sequence_chemistry:  String;
    sequence_group:      SequenceGroup;
    sequence_run_id:     String;
    sample_deviation:    String;
  }
}

impl Sample {
  /// Build a record from the output of [`convert`](crate::convert::convert).
  ///
  /// Columns the schema does not know (`row.extra`) are ignored. Fails only
  /// when the key is missing.
  pub fn from_converted(row: &ConvertedRow) -> Result<Self> {
    let key = row
      .fields
      .iter()
      .find(|(def, _)| def.name == Self::KEY)
      .and_then(|(_, value)| match value {
        FieldValue::Text(s) => Some(s.clone()),
        _ => None,
      })
      .ok_or(Error::MissingKey)?;

    let mut sample = Self::new(key);
    for (def, value) in &row.fields {
      if def.name != Self::KEY {
        sample.set(def.name, value.clone())?;
      }
    }
    Ok(sample)
  }

  /// Every column as a typed value, in [`FIELDS`] order.
  pub fn values(&self) -> Vec<Option<FieldValue>> {
    FIELDS.iter().map(|def| self.get(def.name)).collect()
  }

  /// Required columns that are not set.
  pub fn missing_required(&self) -> Vec<&'static FieldDef> {
    schema::required_fields()
      .filter(|def| self.get(def.name).is_none())
      .collect()
  }
}
