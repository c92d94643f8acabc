//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::display::{SessionSettings, DEFAULT_CHAIN_ID, DEFAULT_PAGE_WIDTH};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "TXDISPLAY_CONFIG";

/// Environment variable overriding the expert-mode preference.
pub const EXPERT_ENV: &str = "TXDISPLAY_EXPERT";

/// Environment variable overriding the expected chain id.
pub const CHAIN_ID_ENV: &str = "TXDISPLAY_CHAIN_ID";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A setting holds a value outside its domain.
    #[error("Invalid value for {setting}: {reason}")]
    InvalidValue {
        /// Setting name as written in the file or environment.
        setting: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/txdisplay/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Expert-mode preference.
    #[serde(default)]
    pub expert_mode: Option<bool>,

    /// Chain id of the expected network (e.g. "secret-4").
    #[serde(default)]
    pub default_chain_id: Option<String>,

    /// Address of the signing device, used to hide own-sender pages.
    #[serde(default)]
    pub own_address: Option<String>,

    /// Columns per value page.
    #[serde(default)]
    pub page_width: Option<usize>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Expert-mode preference.
    pub expert_mode: bool,
    /// Chain id of the expected network.
    pub default_chain_id: String,
    /// Address of the signing device, if known.
    pub own_address: Option<String>,
    /// Columns per value page.
    pub page_width: usize,
    /// Log file location.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            expert_mode: false,
            default_chain_id: DEFAULT_CHAIN_ID.to_string(),
            own_address: None,
            page_width: DEFAULT_PAGE_WIDTH,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Settings handed to a review session.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            expert_preference: self.expert_mode,
            default_chain_id: self.default_chain_id.clone(),
            own_address: self.own_address.clone(),
            page_width: self.page_width,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/txdisplay/txdisplay.log` on Unix-like systems,
/// or the platform equivalent. Falls back to the current directory when no
/// state directory is known.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("txdisplay").join("txdisplay.log")
    } else {
        PathBuf::from("txdisplay.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/txdisplay/config.toml` on Unix, appropriate path on other platforms.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("txdisplay").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `TXDISPLAY_CONFIG` environment variable
/// 3. Default path `~/.config/txdisplay/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for a zero page width or an empty
/// chain id.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let page_width = config.page_width.unwrap_or(defaults.page_width);
    if page_width == 0 {
        return Err(ConfigError::InvalidValue {
            setting: "page_width",
            reason: "must be at least 1".to_string(),
        });
    }
    let default_chain_id = config
        .default_chain_id
        .unwrap_or(defaults.default_chain_id);
    if default_chain_id.is_empty() {
        return Err(ConfigError::InvalidValue {
            setting: "default_chain_id",
            reason: "must not be empty".to_string(),
        });
    }

    Ok(ResolvedConfig {
        expert_mode: config.expert_mode.unwrap_or(defaults.expert_mode),
        default_chain_id,
        own_address: config.own_address.or(defaults.own_address),
        page_width,
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    })
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `TXDISPLAY_EXPERT`: `1`/`true`/`yes`/`on` or `0`/`false`/`no`/`off`
/// - `TXDISPLAY_CHAIN_ID`: expected chain id
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if `TXDISPLAY_EXPERT` is not a
/// recognised boolean.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(raw) = std::env::var(EXPERT_ENV) {
        config.expert_mode = parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
            setting: EXPERT_ENV,
            reason: format!("expected a boolean, got {raw:?}"),
        })?;
    }

    if let Ok(chain_id) = std::env::var(CHAIN_ID_ENV) {
        if !chain_id.is_empty() {
            config.default_chain_id = chain_id;
        }
    }

    Ok(config)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// CLI flags that take part in config resolution. `None` leaves the setting
/// to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--expert`
    pub expert_mode: Option<bool>,
    /// `--default-chain-id`
    pub default_chain_id: Option<String>,
    /// `--own-address`
    pub own_address: Option<String>,
    /// `--page-width`
    pub page_width: Option<usize>,
    /// `--log-file`
    pub log_file_path: Option<PathBuf>,
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, overrides: CliOverrides) -> ResolvedConfig {
    if let Some(expert) = overrides.expert_mode {
        config.expert_mode = expert;
    }

    if let Some(chain_id) = overrides.default_chain_id {
        config.default_chain_id = chain_id;
    }

    if let Some(address) = overrides.own_address {
        config.own_address = Some(address);
    }

    if let Some(width) = overrides.page_width {
        config.page_width = width;
    }

    if let Some(path) = overrides.log_file_path {
        config.log_file_path = path;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
