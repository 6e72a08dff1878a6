//! # CABEL Prep
//!
//! Data preparation for CABEL encoder training: builds per-dataset CUI
//! dictionaries from UMLS concept exports and converts BigBio-style
//! annotated corpora into mention JSONL files (`train/valid/test.jsonl`).

pub mod dictionary;
pub mod error;
pub mod fetch;
pub mod mentions;

// Re-export primary API
pub use dictionary::{ConceptRecord, DictEntry, DictionaryRecord, UmlsInfo};
pub use error::{PrepError, Result};
pub use mentions::{Document, Mention, SemanticGroups, require_raw_corpus};
