//! Configuration module.
//!
//! Settings are resolved in layers: built-in defaults, the TOML config file,
//! environment variables, then command-line flags.

mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, CliOverrides, ConfigError,
    ConfigFile, ResolvedConfig, CHAIN_ID_ENV, CONFIG_ENV, EXPERT_ENV,
};
