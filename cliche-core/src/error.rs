//! Error type for the scanner pipeline.

use thiserror::Error;

/// Errors surfaced to callers of the pipeline.
///
/// Per-transcript problems (undecodable segments, unreadable rows) are
/// recovered inside the batch and only counted; the variants here are the
/// ones that stop a run.
#[derive(Debug, Error)]
pub enum Error {
    /// A required column is absent from an input table.
    #[error("{source_name}: missing required column `{column}`")]
    MissingColumn {
        /// Name of the missing column.
        column: &'static str,
        /// File or stream the table came from.
        source_name: String,
    },

    /// A transcript's serialized segment list could not be decoded.
    #[error("malformed transcript segments: {0}")]
    Segments(#[from] serde_json::Error),

    /// Reading or writing a CSV table failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The dedicated worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
