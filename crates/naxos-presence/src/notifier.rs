//! Backend callbacks for presence transitions.

use async_trait::async_trait;
use naxos_common::{NotifyError, PresenceStatus, UserId};
use naxos_config::{BackendConfig, NotifyMethod};
use tracing::debug;

/// Parameter carrying the user identifier.
pub const USER_PARAM: &str = "sessionid";
/// Parameter carrying `connected` / `disconnected`.
pub const STATUS_PARAM: &str = "status";

/// Longest response body echoed to the log in debug mode.
const MAX_LOGGED_BODY: usize = 200;

/// Receives aggregate presence transitions.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user: &UserId, status: PresenceStatus) -> Result<(), NotifyError>;
}

/// Notifier that calls the forum's presence endpoint over HTTP.
pub struct HttpNotifier {
    http: reqwest::Client,
    endpoint: reqwest::Url,
    method: NotifyMethod,
    log_bodies: bool,
}

impl HttpNotifier {
    /// Build a notifier for `backend`. With `log_bodies` set, response
    /// bodies are written to the debug log.
    pub fn new(backend: &BackendConfig, log_bodies: bool) -> Result<Self, NotifyError> {
        let url = backend.endpoint();
        let endpoint = reqwest::Url::parse(&url)
            .map_err(|e| NotifyError::InvalidEndpoint(format!("{url}: {e}")))?;

        let http = reqwest::Client::builder()
            .connect_timeout(backend.timeout())
            .timeout(backend.timeout())
            .build()
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            method: backend.method,
            log_bodies,
        })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    pub(crate) fn build_request(
        &self,
        user: &UserId,
        status: PresenceStatus,
    ) -> Result<reqwest::Request, NotifyError> {
        let params = [(USER_PARAM, user.as_str()), (STATUS_PARAM, status.as_str())];
        let builder = match self.method {
            NotifyMethod::Get => self.http.get(self.endpoint.clone()).query(&params),
            NotifyMethod::Post => self.http.post(self.endpoint.clone()).form(&params),
        };
        builder
            .build()
            .map_err(|e| NotifyError::InvalidEndpoint(e.to_string()))
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, user: &UserId, status: PresenceStatus) -> Result<(), NotifyError> {
        let request = self.build_request(user, status)?;

        debug!(user = %user, status = %status, method = ?self.method, "Backend notification");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let code = response.status();
        if self.log_bodies {
            let body = response.text().await.unwrap_or_default();
            let body = body.chars().take(MAX_LOGGED_BODY).collect::<String>();
            debug!(user = %user, status = %status, http = %code, body = %body, "Backend response");
        }

        if !code.is_success() {
            return Err(NotifyError::Status(code.as_u16()));
        }
        Ok(())
    }
}
