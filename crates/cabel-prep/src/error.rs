use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during data preparation.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Filesystem error while reading or writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON record could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Corpus download failed.
    #[error("download error: {0}")]
    Http(#[from] reqwest::Error),

    /// An expected input file does not exist.
    #[error("missing input file: {0}")]
    MissingInput(PathBuf),

    /// The dataset has no raw corpus of its own (augmented variants are
    /// assembled downstream from their base corpus).
    #[error("dataset {0} has no raw corpus; prepare its base dataset instead")]
    NoRawCorpus(String),

    /// Registry lookup failed.
    #[error(transparent)]
    Registry(#[from] cabel_core::CabelError),
}

/// Result type alias for preparation operations.
pub type Result<T> = std::result::Result<T, PrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PrepError>();
    }

    #[test]
    fn missing_input_names_the_path() {
        let err = PrepError::MissingInput(PathBuf::from("/data/concepts.jsonl"));
        assert!(err.to_string().contains("concepts.jsonl"));
    }
}
