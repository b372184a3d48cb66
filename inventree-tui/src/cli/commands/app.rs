//! `app`: load settings, connect and run the console

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::api::InvenTreeClient;
use crate::config::Config;
use crate::logging;
use crate::tui::apps::console::{self, ConsoleApp};
use crate::tui::runtime;

pub async fn handle_app(config_filename: Option<&Path>) -> Result<()> {
    let config = Config::load(config_filename)?;
    config.validate().context("Invalid configuration")?;

    let log_file = logging::init(&config)?;

    let (host, token) = config.api_credentials()?;
    let client = InvenTreeClient::new(host, token).context("Failed to create InvenTree client")?;
    log::info!("Using InvenTree at {}", host);

    let ctx = console::Context::new(Arc::new(client), config);
    let state = console::State::new(ctx)?;
    runtime::run::<ConsoleApp>(state).await?;

    log::info!("Exited cleanly, log written to {}", log_file.display());
    Ok(())
}
