//! Filesystem layout shared by the training scripts.
//!
//! All paths derive from a single workspace root so the same submission
//! binary works on any cluster; only the root changes.

use std::path::{Path, PathBuf};

use crate::registry::{Dataset, Model};

/// Derived filesystem locations for one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBundle {
    /// Processed mention JSONL files (`train/valid/test.jsonl`).
    pub data_path: PathBuf,
    /// Directory holding the serialized CUI dictionary for this dataset.
    pub pickle_path: PathBuf,
    /// Biencoder training output directory.
    pub output_path: PathBuf,
    /// Trained biencoder checkpoint inside `output_path`.
    pub checkpoint_path: PathBuf,
    /// Candidate sets produced by the biencoder stage.
    pub candidate_path: PathBuf,
}

/// Resolves registry entries to concrete paths under a workspace root.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/data/<id>/processed`
    pub fn data_dir(&self, dataset: Dataset) -> PathBuf {
        self.root.join("data").join(dataset.id()).join("processed")
    }

    /// `<root>/models/trained/<id>` — where the dataset dictionary lives.
    pub fn dictionary_dir(&self, dataset: Dataset) -> PathBuf {
        self.root.join("models").join("trained").join(dataset.id())
    }

    /// `<root>/models/trained/<id>_mst/pos_neg_loss/no_type`
    pub fn biencoder_output_dir(&self, dataset: Dataset) -> PathBuf {
        self.root
            .join("models")
            .join("trained")
            .join(format!("{}_mst", dataset.id()))
            .join("pos_neg_loss")
            .join("no_type")
    }

    /// Trained biencoder weights for `dataset`.
    pub fn biencoder_checkpoint(&self, dataset: Dataset) -> PathBuf {
        self.biencoder_output_dir(dataset).join("pytorch_model.bin")
    }

    /// Candidate sets emitted by the biencoder stage for `dataset`.
    pub fn candidate_dir(&self, dataset: Dataset) -> PathBuf {
        self.biencoder_output_dir(dataset).join("candidates")
    }

    /// `<root>/models/trained/<id>_mst/crossencoder/<model>`
    pub fn crossencoder_output_dir(&self, dataset: Dataset, model: Model) -> PathBuf {
        self.root
            .join("models")
            .join("trained")
            .join(format!("{}_mst", dataset.id()))
            .join("crossencoder")
            .join(model.id())
    }

    /// `<root>/models/<model>` — pretrained encoder checkpoint directory.
    pub fn pretrained_model_dir(&self, model: Model) -> PathBuf {
        self.root.join("models").join(model.id())
    }

    /// Full path bundle for one dataset.
    pub fn bundle(&self, dataset: Dataset) -> PathBundle {
        PathBundle {
            data_path: self.data_dir(dataset),
            pickle_path: self.dictionary_dir(dataset),
            output_path: self.biencoder_output_dir(dataset),
            checkpoint_path: self.biencoder_checkpoint(dataset),
            candidate_path: self.candidate_dir(dataset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::new("/work/cabel")
    }

    #[test]
    fn emea_bundle_matches_cluster_layout() {
        let bundle = layout().bundle(Dataset::Emea);
        assert_eq!(bundle.data_path, PathBuf::from("/work/cabel/data/emea/processed"));
        assert_eq!(
            bundle.pickle_path,
            PathBuf::from("/work/cabel/models/trained/emea")
        );
        assert_eq!(
            bundle.output_path,
            PathBuf::from("/work/cabel/models/trained/emea_mst/pos_neg_loss/no_type")
        );
    }

    #[test]
    fn every_dataset_resolves_to_a_full_bundle() {
        let layout = layout();
        for ds in Dataset::ALL {
            let bundle = layout.bundle(ds);
            for path in [
                &bundle.data_path,
                &bundle.pickle_path,
                &bundle.output_path,
                &bundle.checkpoint_path,
                &bundle.candidate_path,
            ] {
                assert!(path.starts_with("/work/cabel"), "{ds}: {path:?}");
                assert!(path.to_string_lossy().contains(ds.base().id()));
            }
        }
    }

    #[test]
    fn bundles_are_distinct_per_dataset() {
        let layout = layout();
        let emea = layout.bundle(Dataset::Emea);
        let emea_aug = layout.bundle(Dataset::EmeaAug);
        assert_ne!(emea, emea_aug);
    }

    #[test]
    fn crossencoder_paths_include_the_model() {
        let dir = layout().crossencoder_output_dir(Dataset::Medline, Model::CoderAll);
        assert_eq!(
            dir,
            PathBuf::from("/work/cabel/models/trained/medline_mst/crossencoder/coder-all")
        );
    }
}
