//! File logging
//!
//! The console owns the terminal, so log output goes to a file. `RUST_LOG`
//! overrides the configured level.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use crate::config::Config;

pub fn init(config: &Config) -> Result<PathBuf> {
    let path = config.log_file();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("Logger already initialised")?;

    log::info!("{} {} logging to {}", config.app_name, env!("CARGO_PKG_VERSION"), path.display());
    Ok(path)
}
