//! BigBio document to mention conversion.
//!
//! Turns annotated documents (passages plus entities with character offsets
//! and normalized ids) into the flat mention records the encoder training
//! entry point consumes, one JSON object per line.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use cabel_core::Dataset;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dictionary::UmlsInfo;
use crate::error::{PrepError, Result};

/// Only base corpora have raw sources to convert; the augmented variants
/// are assembled downstream from their base dataset.
pub fn require_raw_corpus(dataset: Dataset) -> Result<()> {
    if Dataset::BASE.contains(&dataset) {
        Ok(())
    } else {
        Err(PrepError::NoRawCorpus(dataset.to_string()))
    }
}

/// One BigBio-style annotated document.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub document_id: String,
    #[serde(default)]
    pub passages: Vec<Passage>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Passage {
    /// BigBio wraps passage text in a singleton list.
    #[serde(default)]
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub text: Vec<String>,
    /// Character offset spans into the concatenated document text.
    #[serde(default)]
    pub offsets: Vec<[usize; 2]>,
    #[serde(default)]
    pub normalized: Vec<NormalizedId>,
    #[serde(rename = "type", default)]
    pub entity_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizedId {
    pub db_id: String,
}

/// Semantic-group lookup tables from the UMLS export.
#[derive(Debug, Clone, Default)]
pub struct SemanticGroups {
    cat_to_group: HashMap<String, String>,
    sem_to_group: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SemanticRow {
    #[serde(alias = "CATEGORY")]
    category: String,
    #[serde(alias = "SEM_CODE")]
    sem_code: String,
    #[serde(alias = "GROUP")]
    group: String,
}

impl SemanticGroups {
    /// Load the semantic-group table from a JSON Lines file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PrepError::MissingInput(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        let mut groups = Self::default();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row: SemanticRow = serde_json::from_str(&line)?;
            groups
                .cat_to_group
                .insert(row.category, row.group.clone());
            groups.sem_to_group.insert(row.sem_code, row.group);
        }
        Ok(groups)
    }

    fn is_group(&self, name: &str) -> bool {
        self.cat_to_group.values().any(|g| g == name)
    }

    fn from_category(&self, name: &str) -> Option<&String> {
        self.cat_to_group.get(name)
    }

    fn from_sem_code(&self, name: &str) -> Option<&String> {
        self.sem_to_group.get(name)
    }
}

/// One converted mention, serialized one-per-line into the split files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    pub mention: String,
    pub mention_id: String,
    pub context_left: String,
    pub context_right: String,
    pub context_doc_id: String,
    #[serde(rename = "type")]
    pub group: String,
    pub label_id: String,
    pub label: String,
    pub label_title: String,
}

/// Slice a string by character offsets, as annotation offsets are
/// codepoint-based rather than byte-based.
fn char_slice(text: &str, start: usize, end: usize) -> (&str, &str) {
    let mut byte_start = text.len();
    let mut byte_end = text.len();
    for (chars, (bytes, _)) in text.char_indices().enumerate() {
        if chars == start {
            byte_start = bytes;
        }
        if chars == end {
            byte_end = bytes;
            break;
        }
    }
    (&text[..byte_start], &text[byte_end..])
}

/// Resolve the semantic group for one entity. `None` means the entity
/// cannot be attributed to a known group and must be skipped.
fn resolve_group(
    cui: &str,
    entity_type: Option<&str>,
    cui_groups: &HashMap<String, Vec<String>>,
    semantic: &SemanticGroups,
) -> Option<String> {
    let groups = cui_groups.get(cui).map(Vec::as_slice).unwrap_or(&[]);
    if let [only] = groups {
        return Some(only.clone());
    }

    let mut group = match entity_type {
        Some(t) if semantic.is_group(t) => t.to_string(),
        Some(t) => {
            if let Some(g) = semantic.from_category(t) {
                g.clone()
            } else if let Some(g) = semantic.from_sem_code(t) {
                g.clone()
            } else {
                info!("no group found for entity type {t:?}");
                "Unknown".to_string()
            }
        }
        None => "Unknown".to_string(),
    };
    // An ambiguous CUI constrains the answer to its own group set.
    if !groups.contains(&group) {
        if let Some(first) = groups.first() {
            group = first.clone();
        }
    }
    if group == "Unknown" {
        info!("group is unknown for CUI {cui}; skipping");
        return None;
    }
    Some(group)
}

/// Convert documents into mention records.
///
/// Entities without a normalized id, or whose CUI/group is absent from the
/// dictionary, are skipped with a warning. `corrected` rewrites known-bad
/// CUIs before lookup.
pub fn convert_documents(
    documents: &[Document],
    umls_info: &UmlsInfo,
    semantic: &SemanticGroups,
    cui_groups: &HashMap<String, Vec<String>>,
    corrected: Option<&HashMap<String, String>>,
) -> Vec<Mention> {
    let mut mentions = Vec::new();
    for doc in documents {
        let all_text = doc
            .passages
            .iter()
            .filter_map(|p| p.text.first().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        let mut entity_id = 1u32;
        for entity in &doc.entities {
            let surface = entity.text.join(" ");
            let Some(normalized) = entity.normalized.first() else {
                warn!("entity {surface:?} has no CUI; skipping");
                continue;
            };
            let mut cui = normalized.db_id.clone();
            if let Some(fixed) = corrected.and_then(|map| map.get(&cui)) {
                info!("corrected CUI {cui} -> {fixed} for entity {surface:?}");
                cui = fixed.clone();
            }
            let Some(group) =
                resolve_group(&cui, entity.entity_type.as_deref(), cui_groups, semantic)
            else {
                continue;
            };
            let Some(entries) = umls_info.get(&group) else {
                warn!("group {group:?} not found in UMLS info; skipping entity {surface:?}");
                continue;
            };
            let Some(entry) = entries.get(&cui) else {
                warn!("CUI {cui:?} not found under group {group:?}; skipping entity {surface:?}");
                continue;
            };

            let start = entity.offsets.first().map_or(0, |span| span[0]);
            let end = entity.offsets.last().map_or(0, |span| span[1]);
            let (left, right) = char_slice(&all_text, start, end);

            mentions.push(Mention {
                mention: surface.trim().to_string(),
                mention_id: format!("{}.{}", doc.document_id, entity_id),
                context_left: left.trim().to_string(),
                context_right: right.trim().to_string(),
                context_doc_id: doc.document_id.clone(),
                group,
                label_id: cui,
                label: entry.description.clone(),
                label_title: entry.title.clone(),
            });
            entity_id += 1;
        }
    }
    mentions
}

/// Load BigBio documents from a JSON Lines file.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    if !path.exists() {
        return Err(PrepError::MissingInput(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    let mut docs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(docs)
}

/// Corrected-code maps come from manual review as two-column CSVs
/// (`bad_code,good_code`, one header line).
pub fn load_corrected_codes(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)?;
    let mut map = HashMap::new();
    for line in content.lines().skip(1) {
        let mut fields = line.splitn(2, ',');
        if let (Some(bad), Some(good)) = (fields.next(), fields.next()) {
            map.insert(bad.trim().to_string(), good.trim().to_string());
        }
    }
    Ok(map)
}

/// File stem for a split; the upstream corpora call the dev split
/// `validation` but the training entry point expects `valid`.
#[must_use]
pub fn split_file_stem(split: &str) -> &str {
    if split == "validation" { "valid" } else { split }
}

/// Write mentions as `<out_dir>/<stem>.jsonl`.
pub fn write_mentions(out_dir: &Path, split: &str, mentions: &[Mention]) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("{}.jsonl", split_file_stem(split)));
    let mut writer = BufWriter::new(File::create(&path)?);
    for mention in mentions {
        writeln!(writer, "{}", serde_json::to_string(mention)?)?;
    }
    info!(
        "wrote {} mentions to {}",
        mentions.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{ConceptRecord, build_umls_info, cui_to_groups};

    fn fixture() -> (Vec<Document>, UmlsInfo, HashMap<String, Vec<String>>) {
        let concepts = vec![
            ConceptRecord {
                cui: "C0004096".into(),
                title: "Asthma".into(),
                group: "DISO".into(),
                entities: vec!["asthma".into()],
            },
            ConceptRecord {
                cui: "C0001443".into(),
                title: "Adenosine".into(),
                group: "CHEM".into(),
                entities: vec![],
            },
        ];
        let docs = vec![Document {
            document_id: "doc1".into(),
            passages: vec![Passage {
                text: vec!["Patients with asthma received adenosine today.".into()],
            }],
            entities: vec![
                Entity {
                    text: vec!["asthma".into()],
                    offsets: vec![[14, 20]],
                    normalized: vec![NormalizedId {
                        db_id: "C0004096".into(),
                    }],
                    entity_type: Some("DISO".into()),
                },
                Entity {
                    text: vec!["adenosine".into()],
                    offsets: vec![[30, 39]],
                    normalized: vec![],
                    entity_type: Some("CHEM".into()),
                },
            ],
        }];
        (docs, build_umls_info(&concepts), cui_to_groups(&concepts))
    }

    fn semantic() -> SemanticGroups {
        let mut groups = SemanticGroups::default();
        groups
            .cat_to_group
            .insert("Disorders".into(), "DISO".into());
        groups.sem_to_group.insert("T047".into(), "DISO".into());
        groups
    }

    #[test]
    fn contexts_come_from_character_offsets() {
        let (docs, info, cui_groups) = fixture();
        let mentions = convert_documents(&docs, &info, &semantic(), &cui_groups, None);
        assert_eq!(mentions.len(), 1);
        let m = &mentions[0];
        assert_eq!(m.mention, "asthma");
        assert_eq!(m.mention_id, "doc1.1");
        assert_eq!(m.context_left, "Patients with");
        assert_eq!(m.context_right, "received adenosine today.");
        assert_eq!(m.label_id, "C0004096");
        assert_eq!(m.label_title, "Asthma");
        assert_eq!(m.group, "DISO");
    }

    #[test]
    fn unnormalized_entities_are_skipped() {
        let (docs, info, cui_groups) = fixture();
        let mentions = convert_documents(&docs, &info, &semantic(), &cui_groups, None);
        assert!(mentions.iter().all(|m| m.mention != "adenosine"));
    }

    #[test]
    fn corrected_codes_rewrite_the_cui() {
        let (mut docs, info, cui_groups) = fixture();
        docs[0].entities[0].normalized[0].db_id = "C9999999".into();
        let corrected: HashMap<String, String> =
            [("C9999999".to_string(), "C0004096".to_string())].into();
        let mentions =
            convert_documents(&docs, &info, &semantic(), &cui_groups, Some(&corrected));
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].label_id, "C0004096");
    }

    #[test]
    fn ambiguous_cui_falls_back_to_entity_type() {
        let mut cui_groups = HashMap::new();
        cui_groups.insert(
            "C1".to_string(),
            vec!["DISO".to_string(), "CHEM".to_string()],
        );
        let group = resolve_group("C1", Some("Disorders"), &cui_groups, &semantic());
        assert_eq!(group.as_deref(), Some("DISO"));

        // unmapped type: first registered group wins
        let group = resolve_group("C1", Some("Gadget"), &cui_groups, &semantic());
        assert_eq!(group.as_deref(), Some("DISO"));
    }

    #[test]
    fn unknown_group_is_skipped() {
        let cui_groups = HashMap::new();
        assert_eq!(
            resolve_group("C1", Some("Gadget"), &cui_groups, &semantic()),
            None
        );
    }

    #[test]
    fn char_slice_handles_multibyte_text() {
        let text = "d\u{e9}j\u{e0} vu again";
        let (left, right) = char_slice(text, 5, 7);
        assert_eq!(left, "d\u{e9}j\u{e0} ");
        assert_eq!(right, " again");
    }

    #[test]
    fn augmented_datasets_have_no_raw_corpus() {
        for ds in Dataset::BASE {
            assert!(require_raw_corpus(ds).is_ok());
        }
        let err = require_raw_corpus(Dataset::EmeaAug).unwrap_err();
        assert!(matches!(err, PrepError::NoRawCorpus(_)));
        assert!(err.to_string().contains("emea_aug"));
    }

    #[test]
    fn validation_split_is_renamed() {
        assert_eq!(split_file_stem("validation"), "valid");
        assert_eq!(split_file_stem("train"), "train");
        assert_eq!(split_file_stem("test"), "test");
    }

    #[test]
    fn corrected_code_csv_skips_header() {
        let dir = std::env::temp_dir().join(format!("cabel-prep-csv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("corrected.csv");
        std::fs::write(&path, "bad,good\nC1,C2\nC3,C4\n").unwrap();
        let map = load_corrected_codes(&path).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["C1"], "C2");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
