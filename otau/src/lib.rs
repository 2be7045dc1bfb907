//! otau - Zigbee OTAU firmware images
//!
//! This library parses Zigbee Over-The-Air-Upgrade firmware images and
//! mirrors the community firmware index to local storage: fetch the index,
//! order and name its entries, download every image concurrently through
//! per-origin clients, and validate each payload against the index.
//!
//! ```no_run
//! # async fn refresh() -> Result<(), otau::pipeline::PipelineError> {
//! let config = otau::config::FetchConfig::default().with_output_dir("firmware");
//! let report = otau::pipeline::run(&config).await?;
//! println!("{} images written", report.written);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod download;
pub mod gateway;
pub mod image;
pub mod index;
pub mod logging;
pub mod origin;
pub mod pipeline;
pub mod validate;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
