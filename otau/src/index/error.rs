//! Index retrieval errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::origin::FetchError;

/// Errors that can occur while retrieving the firmware index.
///
/// Any of these ends the run: without an index there is nothing to download.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to fetch firmware index: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to write index copy to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("firmware index from {url} is not a valid descriptor list: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
