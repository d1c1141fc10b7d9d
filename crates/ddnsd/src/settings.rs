//! Configuration file handling and log level selection

use anyhow::{Context, Result};
use ddns_core::config::CONFIG_TEMPLATE;
use ddns_core::{DdnsConfig, GeneralConfig};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "DDNS_CONFIG_PATH";

/// Configuration file used when `DDNS_CONFIG_PATH` is unset
pub const DEFAULT_CONFIG_PATH: &str = "ddns.toml";

/// Environment variable overriding the configured log level
pub const LOG_LEVEL_ENV: &str = "DDNS_LOG_LEVEL";

/// Resolve the configuration path from the environment value
pub fn config_path(env_value: Option<OsString>) -> PathBuf {
    env_value
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load and validate the configuration at `path`
///
/// A missing file is replaced by the template and reported as an error:
/// the template's placeholder zone would never validate anyway.
pub fn load(path: &Path) -> Result<DdnsConfig> {
    if !path.exists() {
        write_template(path)?;
        anyhow::bail!(
            "Configuration file {} not found! Created an empty one; fill it in and restart",
            path.display()
        );
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    let config = DdnsConfig::from_toml_str(&text)
        .with_context(|| format!("Invalid configuration file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration file {}", path.display()))?;

    Ok(config)
}

fn write_template(path: &Path) -> Result<()> {
    fs::write(path, CONFIG_TEMPLATE).with_context(|| {
        format!(
            "Configuration file {} not found, and creating an empty one failed",
            path.display()
        )
    })
}

/// Open the log file for appending, creating it when missing
pub fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Pick the log level: the environment override wins over `general.debug`
pub fn log_level(general: &GeneralConfig, env_override: Option<&str>) -> Result<Level> {
    match env_override.map(|level| level.trim().to_lowercase()) {
        Some(level) if !level.is_empty() => match level.as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "{} '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                LOG_LEVEL_ENV,
                level
            ),
        },
        _ if general.debug => Ok(Level::DEBUG),
        _ => Ok(Level::INFO),
    }
}
