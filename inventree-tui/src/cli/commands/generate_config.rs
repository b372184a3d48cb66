//! `generate-config`: write the default configuration as TOML

use anyhow::{Context, Result};
use colored::*;
use dialoguer::Confirm;
use std::fs;
use std::path::PathBuf;

use crate::config::Config;

pub fn handle_generate_config(output: Option<PathBuf>) -> Result<()> {
    let Some(path) = output.or_else(Config::default_path) else {
        anyhow::bail!("Could not determine a config directory; pass --output");
    };

    if path.exists() {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", path.display()))
            .default(false)
            .interact()
            .context("Failed to read answer")?;
        if !overwrite {
            println!("{}", "Left existing config untouched".yellow());
            return Ok(());
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = Config::default().to_toml()?;
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} {}", "Wrote config to".green().bold(), path.display().to_string().cyan());
    Ok(())
}
