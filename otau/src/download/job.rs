//! A single firmware download.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::DownloadError;
use super::registry::{Claim, FilenameRegistry};
use crate::index::{image_filename, ImageDescriptor};
use crate::origin::OriginRouter;
use crate::validate::{validate, Finding};

/// State shared by every job of one run.
#[derive(Debug)]
pub struct JobContext {
    pub router: Arc<OriginRouter>,
    pub registry: FilenameRegistry,
    pub output_dir: PathBuf,
}

impl JobContext {
    pub fn new(router: Arc<OriginRouter>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            router,
            registry: FilenameRegistry::new(),
            output_dir: output_dir.into(),
        }
    }
}

/// How a job ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// Payload written; findings are advisory.
    Written {
        filename: String,
        path: PathBuf,
        bytes: usize,
        findings: Vec<Finding>,
    },
    /// Another URL already owns the filename.
    Skipped { filename: String, owner: String },
    Failed {
        filename: String,
        error: DownloadError,
    },
}

impl JobOutcome {
    pub fn filename(&self) -> &str {
        match self {
            JobOutcome::Written { filename, .. }
            | JobOutcome::Skipped { filename, .. }
            | JobOutcome::Failed { filename, .. } => filename,
        }
    }
}

/// One descriptor bound to its output filename.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub filename: String,
    pub descriptor: ImageDescriptor,
}

impl DownloadJob {
    pub fn new(descriptor: ImageDescriptor) -> Self {
        Self {
            filename: image_filename(&descriptor),
            descriptor,
        }
    }

    /// Claim the output filename for this job's URL.
    ///
    /// Claims must be made in launch order, before the job is spawned, so
    /// the earlier of two colliding entries always wins.
    pub fn claim(&self, registry: &FilenameRegistry) -> Claim {
        let url = self.descriptor.url.as_str();
        let claim = registry.claim(&self.filename, url);
        match &claim {
            Claim::Conflict { owner } => warn!(
                filename = %self.filename,
                url = %url,
                owner = %owner,
                "Filename already claimed by another URL, skipping"
            ),
            Claim::AlreadyOwned => {
                debug!(filename = %self.filename, url = %url, "Filename listed twice for the same URL")
            }
            Claim::Claimed => {}
        }
        claim
    }

    /// Fetch, validate and write. The filename must already be claimed.
    pub async fn run(self, context: Arc<JobContext>) -> JobOutcome {
        let DownloadJob {
            filename,
            descriptor,
        } = self;
        let url = descriptor.url.as_str();

        let fetched = match context.router.fetch(url).await {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(filename = %filename, url = %url, error = %err, "Download failed");
                return JobOutcome::Failed {
                    filename,
                    error: err.into(),
                };
            }
        };

        let findings = validate(&descriptor, &fetched.body);
        for finding in &findings {
            warn!(filename = %filename, url = %url, "{}", finding);
        }

        let path = context.output_dir.join(&filename);
        if let Err(source) = tokio::fs::write(&path, &fetched.body).await {
            warn!(filename = %filename, path = %path.display(), error = %source, "Write failed");
            return JobOutcome::Failed {
                filename,
                error: DownloadError::Write { path, source },
            };
        }

        info!(
            filename = %filename,
            bytes = fetched.body.len(),
            source = %fetched.url,
            "Image written"
        );
        JobOutcome::Written {
            filename,
            path,
            bytes: fetched.body.len(),
            findings,
        }
    }
}
