//! Download job errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::origin::FetchError;

/// Errors that abort a single download job, or the whole run when the
/// output directory is unusable.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download task panicked: {0}")]
    Task(String),
}
