use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Reasons the connection gate refuses a handshake.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("missing session credential '{0}'")]
    MissingCredential(String),

    #[error("malformed cookie header: {0}")]
    MalformedCookie(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid backend endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("backend request failed: {0}")]
    Network(String),

    #[error("backend responded with HTTP {0}")]
    Status(u16),
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
