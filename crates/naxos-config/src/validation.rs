//! Configuration validation.
//!
//! All problems are collected and reported together in one error.

use naxos_common::ConfigError;

use crate::schema::RelayConfig;

/// Upper bound on the debounce window.
pub const MAX_DEBOUNCE_MS: u64 = 300_000;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &RelayConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.server.port == 0 {
        errors.push("server.port must be non-zero".into());
    }
    require_non_empty(&mut errors, "server.bind", &config.server.bind);
    require_non_empty(&mut errors, "server.session_cookie", &config.server.session_cookie);
    if config.server.session_cookie.contains(['=', ';', ' ']) {
        errors.push(format!(
            "server.session_cookie = {:?} is not a valid cookie name",
            config.server.session_cookie
        ));
    }
    validate_range(
        &mut errors,
        "server.stats_interval_secs",
        config.server.stats_interval_secs,
        1,
        86_400,
    );

    require_non_empty(&mut errors, "backend.host", &config.backend.host);
    if config.backend.host.contains(['/', ' ']) {
        errors.push(format!("backend.host = {:?} is not a host name", config.backend.host));
    }
    if !matches!(config.backend.scheme.as_str(), "http" | "https") {
        errors.push(format!(
            "backend.scheme = {:?} must be http or https",
            config.backend.scheme
        ));
    }
    if config.backend.port == Some(0) {
        errors.push("backend.port must be non-zero".into());
    }
    if !config.backend.path.starts_with('/') {
        errors.push(format!("backend.path = {:?} must start with '/'", config.backend.path));
    }
    validate_range(&mut errors, "backend.timeout_secs", config.backend.timeout_secs, 1, 120);

    validate_range(
        &mut errors,
        "presence.debounce_ms",
        config.presence.debounce_ms,
        0,
        MAX_DEBOUNCE_MS,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

fn require_non_empty(errors: &mut Vec<String>, name: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{name} must not be empty"));
    }
}
