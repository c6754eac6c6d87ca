//! Configuration for the catalog front-end.
//!
//! Settings are layered: built-in defaults first, then an optional TOML
//! file under the user's config directory, then `BACKLOG_`-prefixed
//! environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000/api/games";
const CONFIG_DIR_NAME: &str = "backlog-tui";
const CONFIG_FILE_NAME: &str = "backlog.toml";

/// User-tunable settings for the terminal client.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the games endpoint, usually a local proxy gateway.
    pub api_base_url: String,
}

impl AppConfig {
    /// Load settings from the default file location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::from_file(Some(&config_file_path()))
    }

    fn from_file(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)
            .context("failed to seed default configuration")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .add_source(Environment::with_prefix("BACKLOG"))
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("invalid configuration values")
    }
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    let path = config_file_path();
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(&path, default_config_contents())
        .with_context(|| format!("failed to write default config {}", path.display()))
}

fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

fn default_config_contents() -> String {
    format!(
        "# Backlog TUI configuration.\n\
         #\n\
         # Base URL of the games endpoint. Point this at the proxy gateway,\n\
         # not directly at the backlog API.\n\
         api_base_url = \"{DEFAULT_API_BASE_URL}\"\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = AppConfig::from_file(None).expect("load defaults");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config =
            AppConfig::from_file(Some(&dir.path().join("absent.toml"))).expect("load defaults");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn file_overrides_default_base_url() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("backlog.toml");
        fs::write(&path, "api_base_url = \"https://proxy.example/api/games\"\n")
            .expect("write config");

        let config = AppConfig::from_file(Some(&path)).expect("load config");
        assert_eq!(config.api_base_url, "https://proxy.example/api/games");
    }

    #[test]
    fn default_file_contents_parse_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("backlog.toml");
        fs::write(&path, default_config_contents()).expect("write config");

        let config = AppConfig::from_file(Some(&path)).expect("load config");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }
}
