//! # Configuration Loader / 配置加载器
//!
//! Reads the TOML file and hands the parsed document to
//! [`AppConfig::from_toml`]. Defaults and value checks live there.

use anyhow::Context;
use ft_core::config::AppConfig;
use std::path::PathBuf;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns error if the file cannot be read, is not valid TOML, or a value
/// has the wrong type.
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))
}
