//! Relay configuration.
//!
//! A `RelayConfig` is assembled from built-in defaults, an optional TOML
//! file, and then the process environment, and is validated before the
//! relay starts. All sections use serde defaults so partial files work.
//!
//! ```rust,no_run
//! use naxos_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod env;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    BackendConfig, LoggingConfig, NotifyMethod, PresenceConfig, RelayConfig, ServerConfig,
};

use std::path::Path;

use naxos_common::ConfigError;

/// Load defaults, overlay `path` if given, then the process environment.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Like [`load_config`], reading variables through `lookup` instead of the
/// process environment.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => RelayConfig::default(),
    };

    env::apply_env(&mut config, lookup)?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &RelayConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
