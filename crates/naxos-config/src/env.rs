//! Environment overrides.
//!
//! The relay is normally deployed next to the forum with its settings in
//! the process environment. Values found here win over the config file.

use naxos_common::ConfigError;

use crate::schema::{NotifyMethod, RelayConfig};

/// Listen port keys, newest first.
pub const LISTEN_PORT_KEYS: [&str; 2] = ["PORT", "NODE_PORT"];
pub const BACKEND_HOST_KEY: &str = "NODE_HOST";
pub const BACKEND_PORT_KEY: &str = "NODE_HOST_PORT";
pub const FORUM_URI_KEY: &str = "FORUM_URI";
pub const DEBUG_KEY: &str = "DEBUG";
pub const DEBOUNCE_KEY: &str = "DEBOUNCE_MS";
pub const METHOD_KEY: &str = "NOTIFY_METHOD";
pub const COOKIE_KEY: &str = "SESSION_COOKIE";

/// Overlay environment values onto `config`.
///
/// `lookup` returns the value of a variable, or `None` when unset. Empty
/// values count as unset.
pub fn apply_env<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some((key, value)) = LISTEN_PORT_KEYS
        .iter()
        .find_map(|key| get(*key).map(|v| (*key, v)))
    {
        config.server.port = parse_port(key, &value)?;
    }

    // NODE_HOST/NODE_HOST_PORT are the earlier deployment's variables.
    // FORUM_URI replaced both and wins when present.
    if let Some(host) = get(BACKEND_HOST_KEY) {
        config.backend.host = normalize_host(&host);
    }
    if let Some(port) = get(BACKEND_PORT_KEY) {
        config.backend.port = Some(parse_port(BACKEND_PORT_KEY, &port)?);
    }
    if let Some(uri) = get(FORUM_URI_KEY) {
        let (host, port) = split_host_port(&uri)?;
        config.backend.host = host;
        config.backend.port = port;
    }

    if let Some(debug) = get(DEBUG_KEY) {
        config.logging.debug = parse_flag(DEBUG_KEY, &debug)?;
    }
    if let Some(ms) = get(DEBOUNCE_KEY) {
        config.presence.debounce_ms = ms.trim().parse().map_err(|e| {
            ConfigError::ParseError(format!("{DEBOUNCE_KEY}={ms:?}: {e}"))
        })?;
    }
    if let Some(method) = get(METHOD_KEY) {
        config.backend.method = NotifyMethod::parse(&method).ok_or_else(|| {
            ConfigError::ParseError(format!("{METHOD_KEY}={method:?}: expected get or post"))
        })?;
    }
    if let Some(cookie) = get(COOKIE_KEY) {
        config.server.session_cookie = cookie.trim().to_string();
    }

    Ok(())
}

fn parse_port(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::ParseError(format!("{key}={value:?}: {e}")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ParseError(format!(
            "{key}={value:?}: expected a boolean"
        ))),
    }
}

/// Bracket a bare IPv6 literal so it can go into a URL authority.
fn normalize_host(host: &str) -> String {
    let host = host.trim();
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_string()
    }
}

/// Split `host[:port]`. IPv6 hosts are either bracketed (`[::1]:8000`) or
/// bare without a port (`::1`).
fn split_host_port(uri: &str) -> Result<(String, Option<u16>), ConfigError> {
    let uri = uri.trim();

    if let Some(rest) = uri.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(|| {
            ConfigError::ParseError(format!("{FORUM_URI_KEY}={uri:?}: unclosed '['"))
        })?;
        let port = match tail {
            "" => None,
            tail => {
                let port = tail.strip_prefix(':').ok_or_else(|| {
                    ConfigError::ParseError(format!("{FORUM_URI_KEY}={uri:?}: expected ':' after ']'"))
                })?;
                Some(parse_port(FORUM_URI_KEY, port)?)
            }
        };
        return Ok((format!("[{host}]"), port));
    }

    if uri.matches(':').count() > 1 {
        return Ok((normalize_host(uri), None));
    }

    match uri.rsplit_once(':') {
        Some((host, port)) => Ok((host.to_string(), Some(parse_port(FORUM_URI_KEY, port)?))),
        None => Ok((uri.to_string(), None)),
    }
}
