//! `create-env`: prompt for the API host and token and write them to an env file

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Input, Password};
use std::fs;
use std::path::Path;

use crate::config::{ENV_API_HOST, ENV_API_TOKEN};

pub fn env_file_contents(host: &str, token: &str) -> String {
    format!("{}={}\n{}={}\n", ENV_API_HOST, host.trim(), ENV_API_TOKEN, token.trim())
}

pub fn handle_create_env(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!("File already exists: {}", output.display());
    }

    let host: String = Input::new()
        .with_prompt("InvenTree API host (e.g. https://inventree.example.com)")
        .interact_text()
        .context("Failed to read API host")?;
    let token = Password::new()
        .with_prompt("InvenTree API token")
        .interact()
        .context("Failed to read API token")?;

    fs::write(output, env_file_contents(&host, &token))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{} {}", "Wrote".green().bold(), output.display().to_string().cyan());
    Ok(())
}
