//! otau CLI - Zigbee OTAU firmware tool
//!
//! Downloads the community firmware index into a local directory and
//! inspects OTAU image files.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use otau::config::{default_log_dir, ConfigFile};

use crate::commands::download::DownloadArgs;
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "otau", version, about = "Download and inspect Zigbee OTAU firmware images")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download every image listed in the firmware index
    Download(DownloadArgs),

    /// Show header and segments of OTAU image files
    Inspect {
        /// Image files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = ConfigFile::load()?;

    let level = match cli.verbose {
        0 => config.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let log_dir = config.log_to_file.then(default_log_dir);
    let _guard = otau::logging::init(level, log_dir.as_deref())?;

    match cli.command {
        Commands::Download(args) => commands::download::run(args, &config),
        Commands::Inspect { files } => commands::inspect::run(&files),
        Commands::Config => commands::config::run(&config),
    }
}
