//! Command-line interface

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inventree-tui")]
#[command(about = "Terminal operator console for InvenTree")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write an env file with the API host and token
    CreateEnv {
        /// Where to write the env file
        #[arg(short, long, default_value = "./.env")]
        output_filename: PathBuf,
    },

    /// Run the console (default)
    App {
        /// Config file to read instead of the default location
        #[arg(short, long)]
        config_filename: Option<PathBuf>,
    },

    /// Write a config file with every setting at its default
    GenerateConfig {
        /// Where to write the config (default: the platform config dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command.unwrap_or(Commands::App { config_filename: None }) {
            Commands::CreateEnv { output_filename } => commands::create_env::handle_create_env(&output_filename),
            Commands::App { config_filename } => commands::app::handle_app(config_filename.as_deref()).await,
            Commands::GenerateConfig { output } => commands::generate_config::handle_generate_config(output),
        }
    }
}
