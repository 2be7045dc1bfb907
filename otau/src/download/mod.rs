//! Firmware download orchestration.
//!
//! Each index entry becomes a [`DownloadJob`]: claim the output filename,
//! fetch through the origin router, validate, write. Jobs run concurrently
//! and fail independently.

mod error;
mod job;
mod orchestrator;
mod registry;

pub use error::DownloadError;
pub use job::{DownloadJob, JobContext, JobOutcome};
pub use orchestrator::{DownloadOrchestrator, DownloadReport};
pub use registry::{Claim, FilenameRegistry};
