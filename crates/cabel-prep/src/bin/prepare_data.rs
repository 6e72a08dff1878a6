//! Prepare encoder training data and dictionaries from BigBio corpora.
//!
//! Reads UMLS concept exports (JSON Lines per source: MM for MedMentions,
//! QUAERO for EMEA/MEDLINE, SPACCC for SPACCC), writes one dictionary per
//! dataset, then converts the annotated corpora into mention JSONL splits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cabel_core::Dataset;
use cabel_prep::dictionary::{
    self, DictionaryRecord, UmlsInfo, build_umls_info, cui_to_groups, flat_records, load_concepts,
};
use cabel_prep::mentions::{
    SemanticGroups, convert_documents, load_corrected_codes, load_documents, require_raw_corpus,
    write_mentions,
};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

/// CLI arguments
#[derive(Parser)]
#[command(name = "prepare-data")]
#[command(about = "Prepare encoder training data and dictionaries from BigBio corpora")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build dictionaries and mention splits for the requested datasets
    Run {
        /// Datasets to process (comma separated)
        #[arg(long, value_delimiter = ',', default_value = "medmentions,emea,medline,spaccc")]
        datasets: Vec<String>,

        /// UMLS export for MedMentions
        #[arg(long, env = "UMLS_MM_PATH", default_value = "data/UMLS_processed/MM")]
        umls_mm_path: PathBuf,

        /// UMLS export for the QUAERO corpora (EMEA, MEDLINE)
        #[arg(long, env = "UMLS_QUAERO_PATH", default_value = "data/UMLS_processed/QUAERO")]
        umls_quaero_path: PathBuf,

        /// UMLS export for SPACCC
        #[arg(long, env = "UMLS_SPACCC_PATH", default_value = "data/UMLS_processed/SPACCC")]
        umls_spaccc_path: PathBuf,

        /// Directory holding the BigBio corpora, one subdirectory per dataset
        #[arg(long, env = "BIGBIO_ROOT", default_value = "data/bigbio")]
        bigbio_root: PathBuf,

        /// Root output directory
        #[arg(long, default_value = "data/final_data_encoder")]
        out_root: PathBuf,

        /// Directory with corrected-code CSVs from manual review
        #[arg(long, default_value = "data/corrected_code")]
        corrected_code_dir: PathBuf,
    },
    /// Download a corpus export
    Fetch {
        /// Source URL
        url: String,

        /// Destination file
        #[arg(long)]
        dest: PathBuf,

        /// Re-download even if the file exists
        #[arg(short, long)]
        force: bool,
    },
}

/// One UMLS source, loaded once and shared by the datasets it backs.
struct UmlsSource {
    info: UmlsInfo,
    cui_groups: HashMap<String, Vec<String>>,
    semantic: SemanticGroups,
    records: Vec<DictionaryRecord>,
}

impl UmlsSource {
    fn load(umls_dir: &Path) -> Result<Self> {
        let concepts = load_concepts(&umls_dir.join("all_disambiguated.jsonl"))
            .with_context(|| format!("loading UMLS concepts from {}", umls_dir.display()))?;
        let info = build_umls_info(&concepts);
        dictionary::write_umls_info(umls_dir, &info)?;
        Ok(Self {
            cui_groups: cui_to_groups(&concepts),
            semantic: SemanticGroups::load(&umls_dir.join("semantic_info.jsonl"))?,
            records: flat_records(&concepts),
            info,
        })
    }
}

fn umls_dir_for(
    dataset: Dataset,
    mm: &Path,
    quaero: &Path,
    spaccc: &Path,
) -> PathBuf {
    match dataset {
        Dataset::MedMentions => mm.to_path_buf(),
        Dataset::Emea | Dataset::Medline => quaero.to_path_buf(),
        Dataset::Spaccc => spaccc.to_path_buf(),
        // run() only accepts base datasets
        other => unreachable!("no raw corpus for {other}"),
    }
}

fn corrected_code_file(dataset: Dataset, dir: &Path) -> Option<PathBuf> {
    let name = match dataset {
        Dataset::Emea | Dataset::Medline => "QUAERO_2014_adapted.csv",
        Dataset::Spaccc => "SPACCC_adapted.csv",
        _ => return None,
    };
    let path = dir.join(name);
    path.exists().then_some(path)
}

#[allow(clippy::too_many_arguments)]
fn run(
    datasets: &[String],
    umls_mm: &Path,
    umls_quaero: &Path,
    umls_spaccc: &Path,
    bigbio_root: &Path,
    out_root: &Path,
    corrected_code_dir: &Path,
) -> Result<()> {
    let mut resolved = Vec::new();
    for name in datasets {
        let dataset: Dataset = name.parse()?;
        require_raw_corpus(dataset)?;
        resolved.push(dataset);
    }

    let mut sources: HashMap<PathBuf, UmlsSource> = HashMap::new();
    for &dataset in &resolved {
        let umls_dir = umls_dir_for(dataset, umls_mm, umls_quaero, umls_spaccc);
        if !sources.contains_key(&umls_dir) {
            info!("loading UMLS source {}", umls_dir.display());
            sources.insert(umls_dir.clone(), UmlsSource::load(&umls_dir)?);
        }
        let source = &sources[&umls_dir];

        let out_dir = out_root.join(dataset.id());
        dictionary::write_dictionary(&out_dir, &source.records)?;

        let corrected = match corrected_code_file(dataset, corrected_code_dir) {
            Some(path) => {
                info!("using corrected code mapping from {}", path.display());
                Some(load_corrected_codes(&path)?)
            }
            None => None,
        };

        for split in ["train", "validation", "test"] {
            let input = bigbio_root.join(dataset.id()).join(format!("{split}.jsonl"));
            if !input.exists() {
                warn!("{} not found, skipping split {split}", input.display());
                continue;
            }
            info!("processing {dataset} {split}");
            let documents = load_documents(&input)?;
            let mentions = convert_documents(
                &documents,
                &source.info,
                &source.semantic,
                &source.cui_groups,
                corrected.as_ref(),
            );
            write_mentions(&out_dir, split, &mentions)?;
        }
    }

    info!("encoder data preparation complete");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            datasets,
            umls_mm_path,
            umls_quaero_path,
            umls_spaccc_path,
            bigbio_root,
            out_root,
            corrected_code_dir,
        } => run(
            &datasets,
            &umls_mm_path,
            &umls_quaero_path,
            &umls_spaccc_path,
            &bigbio_root,
            &out_root,
            &corrected_code_dir,
        ),
        Commands::Fetch { url, dest, force } => {
            cabel_prep::fetch::download(&url, &dest, force)
                .await
                .context("corpus download failed")
        }
    }
}
