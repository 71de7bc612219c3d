//! Subcommand implementations.

pub mod check;
pub mod config_cmd;
pub mod route;

use std::path::{Path, PathBuf};
use warden_config::{ConfigError, WardenConfig};

/// Load the effective configuration.
///
/// An explicit path replaces the default location; environment overrides
/// apply either way.
pub fn load_config(path: Option<&Path>) -> Result<WardenConfig, ConfigError> {
    match path {
        None => WardenConfig::load(),
        Some(path) => {
            let mut config = WardenConfig::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config.validate()?;
            Ok(config)
        }
    }
}

/// Where the configuration is read from.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| WardenConfig::config_dir().join("config.toml"))
}
