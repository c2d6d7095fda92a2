//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod extract;
pub mod plan;

use std::path::Path;

use studs_core::StudsConfig;

/// Load the config named on the command line, or the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StudsConfig> {
    match config_path {
        Some(path) => Ok(StudsConfig::from_file(Path::new(path))?),
        None => Ok(StudsConfig::default()),
    }
}
