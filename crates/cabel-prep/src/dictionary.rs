//! CUI dictionary building from UMLS concept exports.
//!
//! The export is JSON Lines, one record per `(cui, title, group)` with the
//! synonym list already aggregated. Two artifacts are derived from it:
//! a nested `{group: {cui: entry}}` map used during mention conversion, and
//! a flat per-dataset record list the training entry point loads.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PrepError, Result};

/// One row of the UMLS concept export.
///
/// Aliases accept the column names of the upstream export, which kept the
/// original UMLS capitalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptRecord {
    #[serde(alias = "CUI")]
    pub cui: String,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "GROUP")]
    pub group: String,
    /// Synonym surface forms for this concept.
    #[serde(default, alias = "Entity")]
    pub entities: Vec<String>,
}

impl ConceptRecord {
    /// Human-readable description: `title ( group : syn1 ; syn2 )`.
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "{} ( {} : {} )",
            self.title,
            self.group,
            self.entities.join(" ; ")
        )
    }
}

/// Dictionary entry for one CUI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictEntry {
    pub title: String,
    pub description: String,
}

/// Nested dictionary: `{group: {cui: entry}}`.
pub type UmlsInfo = BTreeMap<String, BTreeMap<String, DictEntry>>;

/// Flat dictionary record as the training entry point expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryRecord {
    pub cui: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub group: String,
}

/// Load a concept export from a JSON Lines file.
pub fn load_concepts(path: &Path) -> Result<Vec<ConceptRecord>> {
    if !path.exists() {
        return Err(PrepError::MissingInput(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

/// Build the nested `{group: {cui: entry}}` map.
#[must_use]
pub fn build_umls_info(concepts: &[ConceptRecord]) -> UmlsInfo {
    let mut info = UmlsInfo::new();
    for concept in concepts {
        info.entry(concept.group.clone()).or_default().insert(
            concept.cui.clone(),
            DictEntry {
                title: concept.title.clone(),
                description: concept.description(),
            },
        );
    }
    info
}

/// Map each CUI to the groups it appears under. Most CUIs belong to one
/// group; the ambiguous ones are resolved per mention from the entity type.
#[must_use]
pub fn cui_to_groups(concepts: &[ConceptRecord]) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for concept in concepts {
        let groups = map.entry(concept.cui.clone()).or_default();
        if !groups.contains(&concept.group) {
            groups.push(concept.group.clone());
        }
    }
    map
}

/// Flatten concepts into training-dictionary records.
#[must_use]
pub fn flat_records(concepts: &[ConceptRecord]) -> Vec<DictionaryRecord> {
    concepts
        .iter()
        .map(|c| DictionaryRecord {
            cui: c.cui.clone(),
            title: c.title.clone(),
            description: c.description(),
            group: c.group.clone(),
        })
        .collect()
}

/// Write the nested map next to the concept export as
/// `umls_info_encoder.json`.
pub fn write_umls_info(umls_dir: &Path, info: &UmlsInfo) -> Result<()> {
    let path = umls_dir.join("umls_info_encoder.json");
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(writer, info)?;
    info!("UMLS info saved to {}", path.display());
    Ok(())
}

/// Write a dataset dictionary as `<out_dir>/dictionary.json`.
pub fn write_dictionary(out_dir: &Path, records: &[DictionaryRecord]) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join("dictionary.json");
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(writer, records)?;
    info!("dictionary saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concepts() -> Vec<ConceptRecord> {
        vec![
            ConceptRecord {
                cui: "C0004096".into(),
                title: "Asthma".into(),
                group: "DISO".into(),
                entities: vec!["asthma".into(), "bronchial asthma".into()],
            },
            ConceptRecord {
                cui: "C0004096".into(),
                title: "Asthma".into(),
                group: "PHEN".into(),
                entities: vec!["asthma".into()],
            },
            ConceptRecord {
                cui: "C0001443".into(),
                title: "Adenosine".into(),
                group: "CHEM".into(),
                entities: vec![],
            },
        ]
    }

    #[test]
    fn description_joins_synonyms() {
        let rec = &concepts()[0];
        assert_eq!(
            rec.description(),
            "Asthma ( DISO : asthma ; bronchial asthma )"
        );
    }

    #[test]
    fn umls_info_nests_by_group_then_cui() {
        let info = build_umls_info(&concepts());
        assert_eq!(info.len(), 3);
        let entry = &info["DISO"]["C0004096"];
        assert_eq!(entry.title, "Asthma");
        assert!(entry.description.contains("bronchial asthma"));
    }

    #[test]
    fn ambiguous_cuis_keep_all_groups() {
        let map = cui_to_groups(&concepts());
        assert_eq!(map["C0004096"], vec!["DISO".to_string(), "PHEN".to_string()]);
        assert_eq!(map["C0001443"], vec!["CHEM".to_string()]);
    }

    #[test]
    fn concept_rows_accept_upstream_column_names() {
        let rec: ConceptRecord = serde_json::from_str(
            r#"{"CUI":"C1","Title":"T","GROUP":"DISO","Entity":["a"]}"#,
        )
        .unwrap();
        assert_eq!(rec.cui, "C1");
        assert_eq!(rec.entities, vec!["a".to_string()]);
    }

    #[test]
    fn flat_records_carry_the_type_field() {
        let json = serde_json::to_string(&flat_records(&concepts())[0]).unwrap();
        assert!(json.contains(r#""type":"DISO""#));
    }
}
