//! InvenTree operator console

mod api;
mod cli;
mod config;
mod inventory;
mod logging;
mod tui;
mod update;

use clap::Parser;
use colored::*;
use std::process;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
