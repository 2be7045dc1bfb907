//! Full firmware refresh: index, ordering, downloads.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::FetchConfig;
use crate::download::{DownloadError, DownloadOrchestrator, DownloadReport};
use crate::index::{sort_descriptors, IndexError, IndexFetcher};
use crate::origin::OriginRouter;

/// Errors that end a run before or instead of downloading.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// Fetch the index, sort it and download every image it lists.
///
/// One router is shared by the index fetch and all downloads, so connection
/// pools and per-origin limits span the whole run.
pub async fn run(config: &FetchConfig) -> Result<DownloadReport, PipelineError> {
    let router = Arc::new(OriginRouter::new(
        config.origins.clone(),
        config.client.clone(),
    ));

    let mut fetcher = IndexFetcher::new(Arc::clone(&router), config.index_url.as_str());
    if let Some(path) = &config.audit_path {
        fetcher = fetcher.with_audit_path(path);
    }

    let descriptors = sort_descriptors(fetcher.fetch().await?);
    let duplicates = descriptors.iter().filter(|d| d.duplicate).count();
    info!(images = descriptors.len(), duplicates, "Index sorted");

    let orchestrator = DownloadOrchestrator::new(router, &config.output_dir);
    Ok(orchestrator.run(descriptors).await?)
}
