//! Firmware index retrieval.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::descriptor::ImageDescriptor;
use super::error::IndexError;
use crate::origin::OriginRouter;

/// Canonical location of the community firmware index.
pub const DEFAULT_INDEX_URL: &str =
    "https://raw.githubusercontent.com/Koenkk/zigbee-OTA/master/index.json";

/// File name of the verbatim index copy kept next to the images.
pub const INDEX_AUDIT_FILE: &str = "index.json";

/// Downloads the JSON index and turns it into descriptors.
pub struct IndexFetcher {
    router: Arc<OriginRouter>,
    url: String,
    audit_path: Option<PathBuf>,
}

impl IndexFetcher {
    pub fn new(router: Arc<OriginRouter>, url: impl Into<String>) -> Self {
        Self {
            router,
            url: url.into(),
            audit_path: None,
        }
    }

    /// Keep a verbatim copy of the fetched document at `path`.
    pub fn with_audit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.audit_path = Some(path.into());
        self
    }

    /// Fetch, persist and parse the index.
    ///
    /// Descriptors are returned in document order.
    pub async fn fetch(&self) -> Result<Vec<ImageDescriptor>, IndexError> {
        info!(url = %self.url, "Fetching firmware index");
        let fetched = self.router.fetch(&self.url).await?;

        if let Some(path) = &self.audit_path {
            write_audit_copy(path, &fetched.body).await?;
            debug!(path = %path.display(), bytes = fetched.body.len(), "Index copy written");
        }

        let descriptors: Vec<ImageDescriptor> =
            serde_json::from_slice(&fetched.body).map_err(|source| IndexError::Parse {
                url: self.url.clone(),
                source,
            })?;

        info!(count = descriptors.len(), "Firmware index loaded");
        Ok(descriptors)
    }
}

async fn write_audit_copy(path: &Path, body: &[u8]) -> Result<(), IndexError> {
    let to_error = |source| IndexError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(to_error)?;
    }
    tokio::fs::write(path, body).await.map_err(to_error)
}
