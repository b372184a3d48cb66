//! Application configuration
//!
//! Loaded once at startup from a TOML file, then overridden by the
//! `INVENTREE_API_HOST` / `INVENTREE_API_TOKEN` environment variables (a
//! `.env` file in the working directory is read first). The resulting
//! `Config` is shared behind an `Arc`; nothing reads settings globally.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::inventory::InventoryError;

pub const ENV_API_HOST: &str = "INVENTREE_API_HOST";
pub const ENV_API_TOKEN: &str = "INVENTREE_API_TOKEN";
const CONFIG_DIR: &str = "inventree-tui";
const CONFIG_FILE: &str = "inventree-tui.toml";
const LOG_FILE: &str = "inventree-tui.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartSearchTabConfig {
    /// Leading search results whose stock is listed straight away
    pub auto_expand: usize,
}

impl Default for PartSearchTabConfig {
    fn default() -> Self {
        Self { auto_expand: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockOpsTabConfig {
    pub history_delta_minutes: u32,
    pub history_delta_hours: u32,
    pub history_delta_days: u32,
    /// Page size used when reading stock history
    pub history_chunk_size: u32,
}

impl Default for StockOpsTabConfig {
    fn default() -> Self {
        Self {
            history_delta_minutes: 0,
            history_delta_hours: 8,
            history_delta_days: 0,
            history_chunk_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_name: String,
    pub sound_enabled: bool,
    pub tts_enabled: bool,
    pub update_check: bool,
    pub inventree_api_host: Option<String>,
    pub inventree_api_token: Option<String>,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub part_search_tab: PartSearchTabConfig,
    pub stock_ops_tab: StockOpsTabConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "InvenTree TUI".to_string(),
            sound_enabled: false,
            tts_enabled: false,
            update_check: true,
            inventree_api_host: None,
            inventree_api_token: None,
            log_level: "info".to_string(),
            log_file: None,
            part_search_tab: PartSearchTabConfig::default(),
            stock_ops_tab: StockOpsTabConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path` (or the default location), then apply `.env` and
    /// environment overrides. An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    log::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        if let Ok(env_file) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", env_file.display());
        }
        config.apply_env_with(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Override API credentials from variables returned by `lookup`
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup(ENV_API_HOST).filter(|v| !v.trim().is_empty()) {
            self.inventree_api_host = Some(host);
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.inventree_api_token = Some(token);
        }
    }

    /// Host and token, or a configuration error naming what is missing
    pub fn api_credentials(&self) -> Result<(&str, &str), InventoryError> {
        let host = self
            .inventree_api_host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| {
                InventoryError::Configuration(format!(
                    "API host not set (set {} or inventree_api_host)",
                    ENV_API_HOST
                ))
            })?;
        let token = self
            .inventree_api_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                InventoryError::Configuration(format!(
                    "API token not set (set {} or inventree_api_token)",
                    ENV_API_TOKEN
                ))
            })?;
        Ok((host, token))
    }

    pub fn validate(&self) -> Result<(), InventoryError> {
        self.api_credentials()?;
        if self.stock_ops_tab.history_chunk_size == 0 {
            return Err(InventoryError::Configuration(
                "stock_ops_tab.history_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.history_lookback() <= chrono::Duration::zero() {
            return Err(InventoryError::Configuration(
                "stock_ops_tab history window must be longer than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// How far back the stock operations tab reads history
    pub fn history_lookback(&self) -> chrono::Duration {
        let tab = &self.stock_ops_tab;
        chrono::Duration::minutes(tab.history_delta_minutes as i64)
            + chrono::Duration::hours(tab.history_delta_hours as i64)
            + chrono::Duration::days(tab.history_delta_days as i64)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|dir| dir.join(CONFIG_DIR))
                .unwrap_or_else(std::env::temp_dir)
                .join(LOG_FILE)
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_credentials() -> Config {
        Config {
            inventree_api_host: Some("https://inventree.local".to_string()),
            inventree_api_token: Some("abc".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.app_name, "InvenTree TUI");
        assert!(!config.sound_enabled);
        assert_eq!(config.part_search_tab.auto_expand, 5);
        assert_eq!(config.stock_ops_tab.history_chunk_size, 10);
        assert_eq!(config.history_lookback(), chrono::Duration::hours(8));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            app_name = "Stores"

            [stock_ops_tab]
            history_delta_days = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.app_name, "Stores");
        assert_eq!(config.stock_ops_tab.history_delta_hours, 8);
        assert_eq!(config.history_lookback(), chrono::Duration::hours(32));
        assert_eq!(config.part_search_tab, PartSearchTabConfig::default());
    }

    #[test]
    fn test_generated_file_reads_back() {
        let config = Config::default();
        let parsed = Config::from_toml_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [(ENV_API_HOST, "http://env-host"), (ENV_API_TOKEN, "")].into();
        let mut config = with_credentials();
        config.apply_env_with(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.inventree_api_host.as_deref(), Some("http://env-host"));
        // Empty values do not clear the file's token
        assert_eq!(config.inventree_api_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_missing_credentials_fail_validation() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, InventoryError::Configuration(_)));
        assert!(err.to_string().contains(ENV_API_HOST));
        assert!(with_credentials().validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = with_credentials();
        config.stock_ops_tab.history_chunk_size = 0;
        assert!(config.validate().is_err());
    }
}
