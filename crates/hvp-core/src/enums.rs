//! Closed enumerations used by the sample record.
//!
//! Each enumeration carries its wire spelling explicitly; matching is exact
//! and case-sensitive.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
  Error, Result,
  schema::{FieldKind, FieldType, FieldValue},
};

macro_rules! closed_enum {
  (
    $(#[$meta:meta])*
    $name:ident {
      $( $variant:ident => $value:literal ),+ $(,)?
    }
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum $name {
      $( $variant, )+
    }

    impl $name {
      /// Every allowed spelling, in declaration order.
      pub const ALLOWED: &'static [&'static str] = &[$( $value ),+];

      pub fn as_str(self) -> &'static str {
        match self {
          $( Self::$variant => $value, )+
        }
      }
    }

    impl FromStr for $name {
      type Err = Error;

      fn from_str(s: &str) -> Result<Self> {
        match s {
          $( $value => Ok(Self::$variant), )+
          other => Err(Error::UnknownVariant {
            kind:  stringify!($name),
            value: other.to_owned(),
          }),
        }
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl Serialize for $name {
      fn serialize<S: Serializer>(
        &self,
        serializer: S,
      ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
      }
    }

    impl<'de> Deserialize<'de> for $name {
      fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
      ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
      }
    }

    impl FieldType for $name {
      const KIND: FieldKind = FieldKind::Enum(Self::ALLOWED);

      fn from_value(value: FieldValue) -> Option<Self> {
        match value {
          FieldValue::Enum(s) => s.parse().ok(),
          FieldValue::Text(s) => s.parse().ok(),
          FieldValue::Date(_) => None,
        }
      }

      fn to_value(&self) -> FieldValue { FieldValue::Enum(self.as_str()) }
    }
  };
}

// ─── Provenance ──────────────────────────────────────────────────────────────

closed_enum! {
  /// Body site the specimen was collected from.
  AnatomicalSite {
    NpSwab           => "np_swab",
    BuccalSwab       => "buccal_swab",
    TongueDorsum     => "tongue_dorsum",
    Saliva           => "saliva",
    OpWash           => "op_wash",
    DentalPlaque     => "dental_plaque",
    Serum            => "serum",
    WholeBlood       => "whole_blood",
    Periglottic      => "periglottic",
    BalA             => "bal_a",
    BalB             => "bal_b",
    BronchPrewash    => "bronch_prewash",
    EndobronchBrushL => "endobronch_brush_l",
    EndobronchBrushR => "endobronch_brush_r",
    Stool            => "stool",
  }
}

closed_enum! {
  /// Laboratory the sample originated from.
  LabOrigin {
    Wu      => "wu",
    Teles   => "teles",
    Zemel   => "zemel",
    Collman => "collman",
  }
}

closed_enum! {
  StorageBuffer {
    Neat         => "neat",
    BeadBeater   => "bead_beater",
    Vtm          => "vtm",
    Pbs          => "pbs",
    ZymoShield   => "zymo_shield",
    OralCocktail => "oral_cocktail",
  }
}

// ─── Processing stages ───────────────────────────────────────────────────────

closed_enum! {
  PrepType {
    Metagenomic              => "metagenomic",
    SixteenS                 => "16s",
    ViromePrepGuanxiang      => "virome_prep_guanxiang",
    ViromePrepColinHill      => "virome_prep_colin_hill",
    ViromePrepMatthijnssens  => "virome_prep_matthijnssens",
  }
}

closed_enum! {
  ExtractionType {
    None                  => "none",
    QiaampViralRnaMinikit => "qiaamp_viral_rna_minikit",
    Allprep               => "allprep",
  }
}

closed_enum! {
  RnaExtractionType {
    PowersoilPro => "powersoil_pro",
    Allprep      => "allprep",
  }
}

closed_enum! {
  DnaExtractionType {
    PowersoilPro => "powersoil_pro",
    Allprep      => "allprep",
  }
}

closed_enum! {
  /// Whole-genome/transcriptome amplification method.
  AmplifiedType {
    None      => "none",
    Wta2      => "wta2",
    Pta       => "pta",
    Malbac    => "malbac",
    Genomephi => "genomephi",
  }
}

closed_enum! {
  LibraryType {
    NexteraXt             => "nextera_xt",
    Pta                   => "pta",
    OntRapidPcrBarcoding  => "ont_rapid_pcr_barcoding",
    OntRapidSequencingKit => "ont_rapid_sequencing_kit",
    PacbioAmplifi         => "pacbio_amplifi",
    PacbioHifi            => "pacbio_hifi",
  }
}

closed_enum! {
  BarcodeSet {
    A => "A",
    B => "B",
    C => "C",
    D => "D",
  }
}

// ─── Sequencing ──────────────────────────────────────────────────────────────

closed_enum! {
  SampleUse {
    Experiment => "experiment",
    Pilot      => "pilot",
  }
}

closed_enum! {
  SequencePlatform {
    MiseqI100 => "miseq_i100",
    Nextseq   => "nextseq",
    Miseq     => "miseq",
    Miniseq   => "miniseq",
    Minion    => "minion",
    Pacbio    => "pacbio",
  }
}

closed_enum! {
  /// Group responsible for the sequencing run.
  SequenceGroup {
    Bushman  => "bushman",
    Moustafa => "moustafa",
  }
}
