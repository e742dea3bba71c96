//! Connection gate: admits a handshake only if it carries a session cookie.

use cookie::Cookie;
use naxos_common::{GateError, UserId};
use tokio_tungstenite::tungstenite::handshake::server::ErrorResponse;
use tokio_tungstenite::tungstenite::http::{header::COOKIE, HeaderMap, StatusCode};

/// Extracts the user identifier from handshake cookies.
#[derive(Debug, Clone)]
pub struct Gate {
    cookie_name: String,
}

impl Gate {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    /// Find the session cookie in `headers`.
    ///
    /// Every `Cookie` header is searched and unparseable pairs are skipped.
    /// An empty value counts as missing.
    pub fn admit(&self, headers: &HeaderMap) -> Result<UserId, GateError> {
        for value in headers.get_all(COOKIE) {
            let raw = value
                .to_str()
                .map_err(|e| GateError::MalformedCookie(e.to_string()))?;

            let found = Cookie::split_parse(raw)
                .filter_map(Result::ok)
                .find(|cookie| cookie.name() == self.cookie_name)
                .and_then(|cookie| UserId::parse(cookie.value()));

            if let Some(user) = found {
                return Ok(user);
            }
        }
        Err(GateError::MissingCredential(self.cookie_name.clone()))
    }
}

/// HTTP response that aborts the handshake for `err`.
pub fn reject(err: &GateError) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(err.to_string()));
    *response.status_mut() = match err {
        GateError::MissingCredential(_) => StatusCode::UNAUTHORIZED,
        GateError::MalformedCookie(_) => StatusCode::BAD_REQUEST,
    };
    response
}
