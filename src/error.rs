//! Batch-level error type.

use crate::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// No source produced a single normalized record; nothing is written.
    #[error("no source produced any normalized records")]
    NoRecords,

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row store error: {0}")]
    Store(#[from] StoreError),
}
