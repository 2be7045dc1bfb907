//! `otau config`: show the effective configuration.

use otau::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Print the configuration file path and the effective settings.
pub fn run(config: &ConfigFile) -> Result<(), CliError> {
    let path = config_file_path();
    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not found, using defaults)", path.display());
    }
    println!();
    print!("{}", config.to_ini_string());
    Ok(())
}
