use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a run before the pipeline starts.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source unavailable: {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },
    #[error("unsupported source format: {0} (expected .csv or .parquet)")]
    UnsupportedFormat(PathBuf),
}

impl PipelineError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PipelineError::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
