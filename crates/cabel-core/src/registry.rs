//! Closed registries of datasets and pretrained models.
//!
//! Every dataset and encoder checkpoint a job can be submitted for must be
//! listed here. Resolution is exhaustive: an unknown name is an error, never
//! a fallthrough to a default path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CabelError;

/// Annotated corpora the training pipeline knows about.
///
/// The `*Aug` variants are the synthetic-augmented versions of the base
/// corpora. Canonical string ids are lowercase; parsing accepts any case so
/// the historical `EMEA` / `emea` spellings both resolve to the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dataset {
    MedMentions,
    Emea,
    Medline,
    Spaccc,
    MedMentionsAug,
    EmeaAug,
    MedlineAug,
    SpacccAug,
}

impl Dataset {
    /// Every registered dataset, in submission order.
    pub const ALL: [Dataset; 8] = [
        Dataset::MedMentions,
        Dataset::Emea,
        Dataset::Medline,
        Dataset::Spaccc,
        Dataset::MedMentionsAug,
        Dataset::EmeaAug,
        Dataset::MedlineAug,
        Dataset::SpacccAug,
    ];

    /// The base corpora (no synthetic augmentation). These are the only
    /// datasets the preparation pipeline can build from raw sources.
    pub const BASE: [Dataset; 4] = [
        Dataset::MedMentions,
        Dataset::Emea,
        Dataset::Medline,
        Dataset::Spaccc,
    ];

    /// Canonical lowercase identifier, used in paths and env vars.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::MedMentions => "medmentions",
            Self::Emea => "emea",
            Self::Medline => "medline",
            Self::Spaccc => "spaccc",
            Self::MedMentionsAug => "medmentions_aug",
            Self::EmeaAug => "emea_aug",
            Self::MedlineAug => "medline_aug",
            Self::SpacccAug => "spaccc_aug",
        }
    }

    /// The base corpus this dataset is derived from.
    #[must_use]
    pub fn base(self) -> Dataset {
        match self {
            Self::MedMentionsAug => Self::MedMentions,
            Self::EmeaAug => Self::Emea,
            Self::MedlineAug => Self::Medline,
            Self::SpacccAug => Self::Spaccc,
            other => other,
        }
    }

    /// Biencoder epoch count for this dataset.
    ///
    /// MedMentions is an order of magnitude larger than the QUAERO corpora,
    /// so it converges in far fewer passes.
    #[must_use]
    pub fn epochs(self) -> u32 {
        match self.base() {
            Self::MedMentions => 5,
            Self::Emea | Self::Medline => 100,
            Self::Spaccc => 40,
            // base() only returns base variants
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Dataset {
    type Err = CabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "medmentions" => Ok(Self::MedMentions),
            "emea" => Ok(Self::Emea),
            "medline" => Ok(Self::Medline),
            "spaccc" => Ok(Self::Spaccc),
            "medmentions_aug" => Ok(Self::MedMentionsAug),
            "emea_aug" => Ok(Self::EmeaAug),
            "medline_aug" => Ok(Self::MedlineAug),
            "spaccc_aug" => Ok(Self::SpacccAug),
            _ => Err(CabelError::UnknownDataset(s.to_string())),
        }
    }
}

/// Pretrained encoder checkpoints usable as the crossencoder backbone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    Biobert,
    BiobertV1,
    CoderAll,
}

impl Model {
    /// Every registered model.
    pub const ALL: [Model; 3] = [Model::Biobert, Model::BiobertV1, Model::CoderAll];

    /// Canonical identifier, matching the checkpoint directory name.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Biobert => "biobert",
            Self::BiobertV1 => "biobert_v1",
            Self::CoderAll => "coder-all",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Model {
    type Err = CabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "biobert" => Ok(Self::Biobert),
            "biobert_v1" => Ok(Self::BiobertV1),
            "coder-all" => Ok(Self::CoderAll),
            _ => Err(CabelError::UnknownModel(s.to_string())),
        }
    }
}
