use thiserror::Error;

/// Errors that can occur while resolving registry entries or submitting jobs.
#[derive(Debug, Error)]
pub enum CabelError {
    /// The dataset name is not in the registry.
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    /// The model name is not in the registry.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Filesystem error (log directory creation, script lookup).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),

    /// The scheduler rejected the submission.
    #[error("sbatch failed for job {job}: {detail}")]
    SubmitFailed {
        /// Name of the job whose submission failed.
        job: String,
        /// Exit status and captured stderr from `sbatch`.
        detail: String,
    },

    /// The scheduler accepted the job but its reply could not be parsed.
    #[error("could not parse scheduler reply: {0:?}")]
    MalformedReply(String),
}

/// Result type alias for CABEL core operations.
pub type Result<T> = std::result::Result<T, CabelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = CabelError::UnknownDataset("Foo".into());
        assert_eq!(err.to_string(), "Unknown dataset: Foo");

        let err = CabelError::UnknownModel("bart".into());
        assert_eq!(err.to_string(), "Unknown model: bart");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CabelError>();
    }
}
