//! Startup check for a newer published release

use anyhow::{Context, Result};
use semver::Version;
use serde::Deserialize;
use std::time::Duration;

const CRATES_IO_URL: &str = "https://crates.io/api/v1/crates/inventree-tui";

#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    max_stable_version: Option<String>,
    max_version: String,
}

/// `latest` when it is strictly newer than `current`
pub fn newer_version(current: &str, latest: &str) -> Option<Version> {
    let current = Version::parse(current).ok()?;
    let latest = Version::parse(latest.trim_start_matches('v')).ok()?;
    (latest > current).then_some(latest)
}

/// Ask crates.io for the newest release. `Ok(None)` when up to date.
pub async fn check_for_update() -> Result<Option<Version>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(concat!("inventree-tui/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let response: CrateResponse = client
        .get(CRATES_IO_URL)
        .send()
        .await
        .context("Failed to reach crates.io")?
        .error_for_status()
        .context("crates.io returned an error")?
        .json()
        .await
        .context("Failed to parse crates.io response")?;

    let latest = response.krate.max_stable_version.unwrap_or(response.krate.max_version);
    let newer = newer_version(env!("CARGO_PKG_VERSION"), &latest);
    match &newer {
        Some(version) => log::info!("Version {} is available", version),
        None => log::debug!("Up to date (latest published: {})", latest),
    }
    Ok(newer)
}
