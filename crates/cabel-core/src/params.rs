//! Per-job parameter assembly.
//!
//! Pure computation over the registry and layout tables: each (dataset
//! [, model]) combination yields a job name and the environment variable
//! set the training entry point expects.

use std::path::Path;

use crate::layout::Layout;
use crate::registry::{Dataset, Model};

/// Fully assembled parameters for one training job.
#[derive(Debug, Clone)]
pub struct JobParams {
    /// Unique job name within one run.
    pub job_name: String,
    /// Environment variables exported to the job script.
    pub env: Vec<(String, String)>,
}

fn path_var(name: &str, path: &Path) -> (String, String) {
    (name.to_string(), path.to_string_lossy().into_owned())
}

impl JobParams {
    /// Parameters for a biencoder training job on `dataset`.
    #[must_use]
    pub fn biencoder(dataset: Dataset, layout: &Layout) -> Self {
        let bundle = layout.bundle(dataset);
        Self {
            job_name: format!("bienc-{}", dataset.id()),
            env: vec![
                ("DATASET".into(), dataset.id().into()),
                path_var("DATA_PATH", &bundle.data_path),
                path_var("OUTPUT_PATH", &bundle.output_path),
                path_var("PICKLE_SRC_PATH", &bundle.pickle_path),
                ("EPOCHS".into(), dataset.epochs().to_string()),
            ],
        }
    }

    /// Parameters for a crossencoder training job on `dataset` with the
    /// pretrained `model` backbone. Consumes the biencoder stage outputs,
    /// so the checkpoint and candidate paths point into the biencoder
    /// output directory.
    #[must_use]
    pub fn crossencoder(dataset: Dataset, model: Model, layout: &Layout) -> Self {
        let bundle = layout.bundle(dataset);
        Self {
            job_name: format!("cross-{}-{}", dataset.id(), model.id()),
            env: vec![
                ("DATASET".into(), dataset.id().into()),
                path_var("DATA_PATH", &bundle.data_path),
                path_var(
                    "OUTPUT_PATH",
                    &layout.crossencoder_output_dir(dataset, model),
                ),
                path_var("PICKLE_SRC_PATH", &bundle.pickle_path),
                path_var("BERT_MODEL", &layout.pretrained_model_dir(model)),
                path_var("BIENCODER_PATH", &bundle.checkpoint_path),
                path_var("BIENCODER_CAND", &bundle.candidate_path),
                ("EPOCHS".into(), dataset.epochs().to_string()),
            ],
        }
    }

    /// Value of one exported variable, if present.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
