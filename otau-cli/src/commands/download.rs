//! `otau download`: mirror every image of the firmware index.

use std::path::PathBuf;

use clap::Args;
use otau::config::{ConfigFile, FetchConfig, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};
use otau::pipeline;
use tracing::info;

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Directory to store images in (default: output_dir from config.ini)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS))]
    pub timeout: Option<u64>,

    /// Location of the firmware index
    #[arg(long)]
    pub index_url: Option<String>,
}

/// Build the effective settings: command line first, then config file.
pub fn fetch_config(args: &DownloadArgs, config: &ConfigFile) -> FetchConfig {
    let mut fetch = FetchConfig::from_config(config);
    if let Some(dir) = &args.output {
        fetch = fetch.with_output_dir(dir);
    }
    if let Some(secs) = args.timeout {
        fetch = fetch.with_timeout_secs(secs);
    }
    if let Some(url) = &args.index_url {
        fetch = fetch.with_index_url(url.as_str());
    }
    fetch
}

pub fn run(args: DownloadArgs, config: &ConfigFile) -> Result<(), CliError> {
    let fetch = fetch_config(&args, config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    let report = runtime.block_on(pipeline::run(&fetch))?;
    info!(dir = %fetch.output_dir.display(), "Done");

    println!(
        "{} written, {} skipped, {} failed, {} validation warnings",
        report.written, report.skipped, report.failed, report.findings
    );
    Ok(())
}
