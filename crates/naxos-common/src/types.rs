use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate presence transition reported to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Connected,
    Disconnected,
}

impl PresenceStatus {
    /// Value sent in the backend's `status` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            PresenceStatus::Connected => "connected",
            PresenceStatus::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
