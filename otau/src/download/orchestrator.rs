//! Concurrent download of every indexed image.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use super::error::DownloadError;
use super::job::{DownloadJob, JobContext, JobOutcome};
use super::registry::Claim;
use crate::index::ImageDescriptor;
use crate::origin::OriginRouter;

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Validation findings across all written images.
    pub findings: usize,
}

impl DownloadReport {
    pub fn record(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Written { findings, .. } => {
                self.written += 1;
                self.findings += findings.len();
            }
            JobOutcome::Skipped { .. } => self.skipped += 1,
            JobOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.written + self.skipped + self.failed
    }
}

/// A job that was either resolved at claim time or spawned.
enum Launched {
    Skipped(JobOutcome),
    Running {
        filename: String,
        handle: JoinHandle<JobOutcome>,
    },
}

/// Runs one download job per descriptor.
///
/// Every job is spawned before any is awaited; results are then collected
/// in launch order. A failing job never affects the others.
pub struct DownloadOrchestrator {
    context: Arc<JobContext>,
}

impl DownloadOrchestrator {
    pub fn new(router: Arc<OriginRouter>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            context: Arc::new(JobContext::new(router, output_dir)),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.context.output_dir
    }

    /// Download `descriptors`, which are expected in sorted order.
    pub async fn run(
        &self,
        descriptors: Vec<ImageDescriptor>,
    ) -> Result<DownloadReport, DownloadError> {
        let output_dir = &self.context.output_dir;
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| DownloadError::OutputDir {
                path: output_dir.clone(),
                source,
            })?;

        info!(jobs = descriptors.len(), dir = %output_dir.display(), "Starting downloads");

        // Filenames are claimed here, in launch order, so the first of two
        // colliding entries wins regardless of task scheduling.
        let mut launched = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let job = DownloadJob::new(descriptor);
            match job.claim(&self.context.registry) {
                Claim::Conflict { owner } => launched.push(Launched::Skipped(JobOutcome::Skipped {
                    filename: job.filename,
                    owner,
                })),
                Claim::Claimed | Claim::AlreadyOwned => {
                    let filename = job.filename.clone();
                    let handle = tokio::spawn(job.run(Arc::clone(&self.context)));
                    launched.push(Launched::Running { filename, handle });
                }
            }
        }

        let mut report = DownloadReport::default();
        for entry in launched {
            let outcome = match entry {
                Launched::Skipped(outcome) => outcome,
                Launched::Running { filename, handle } => match handle.await {
                    Ok(outcome) => outcome,
                    Err(join_error) => {
                        error!(filename = %filename, error = %join_error, "Download task aborted");
                        JobOutcome::Failed {
                            filename,
                            error: DownloadError::Task(join_error.to_string()),
                        }
                    }
                },
            };
            report.record(&outcome);
        }

        info!(
            written = report.written,
            skipped = report.skipped,
            failed = report.failed,
            findings = report.findings,
            "Downloads complete"
        );
        Ok(report)
    }
}
