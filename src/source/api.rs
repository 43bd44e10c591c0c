//! Client for the ping-monitor HTTP service.
//!
//! ## Endpoints
//!
//! - `GET /api/ping_results`: the current [`Snapshot`]
//! - `POST /api/reset_vpn` with `{"password": ...}`: run the remote tunnel reset
//! - `POST /api/clear_tunnel_down` with `{}`: acknowledge the outage flag
//!
//! [`MonitorApi`] is the seam the rest of the crate talks to; [`HttpApi`] is
//! the `reqwest` implementation.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ApiError, Snapshot};
use crate::recovery::Credential;

/// Default timeout for polls and the clear call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
/// Default timeout for a reset request. The remote session alone waits 30 s.
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(120);

/// Response body of a reset request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResetResponse {
    /// Free-form status message from the service.
    #[serde(default)]
    pub message: String,
    /// Transcript of the remote session, oldest line first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<String>>,
}

/// Operations the dashboard needs from the monitor service.
#[async_trait]
pub trait MonitorApi: Send + Sync + Debug {
    /// Read the current snapshot.
    async fn fetch_snapshot(&self) -> Result<Snapshot, ApiError>;

    /// Ask the service to reset the tunnels.
    ///
    /// The credential is consumed; it is wiped when the call returns. A
    /// non-success reply whose body still decodes comes back as
    /// [`ApiError::Rejected`] so the service's own message is not lost.
    async fn reset_vpn(&self, credential: Credential) -> Result<ResetResponse, ApiError>;

    /// Ask the service to clear its tunnels-down flag.
    async fn clear_tunnel_down(&self) -> Result<serde_json::Value, ApiError>;

    /// Human-readable description of the endpoint, for the status bar.
    fn description(&self) -> &str;
}

#[derive(Serialize)]
struct ResetRequest<'a> {
    password: &'a str,
}

/// [`MonitorApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    endpoint: String,
    description: String,
    timeout: Duration,
    reset_timeout: Duration,
}

impl HttpApi {
    /// Create a new builder for configuring the client.
    pub fn builder() -> HttpApiBuilder {
        HttpApiBuilder::default()
    }

    /// Base URL of the service.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.endpoint, path)
    }

    fn check_status(response: &reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status(status.as_u16()))
        }
    }
}

#[async_trait]
impl MonitorApi for HttpApi {
    async fn fetch_snapshot(&self) -> Result<Snapshot, ApiError> {
        let response = self
            .client
            .get(self.url("ping_results"))
            .timeout(self.timeout)
            .send()
            .await?;
        Self::check_status(&response)?;

        let body = response.text().await?;
        Ok(Snapshot::from_json(&body)?)
    }

    async fn reset_vpn(&self, credential: Credential) -> Result<ResetResponse, ApiError> {
        let request = ResetRequest {
            password: credential.expose(),
        };
        let response = self
            .client
            .post(self.url("reset_vpn"))
            .timeout(self.reset_timeout)
            .json(&request)
            .send()
            .await?;
        drop(credential);

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }
        match serde_json::from_str::<ResetResponse>(&body) {
            Ok(response) => Err(ApiError::Rejected {
                status: status.as_u16(),
                response,
            }),
            Err(_) => Err(ApiError::Status(status.as_u16())),
        }
    }

    async fn clear_tunnel_down(&self) -> Result<serde_json::Value, ApiError> {
        let response = self
            .client
            .post(self.url("clear_tunnel_down"))
            .timeout(self.timeout)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        Self::check_status(&response)?;

        response.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpApi`].
#[derive(Debug, Default)]
pub struct HttpApiBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    reset_timeout: Option<Duration>,
}

impl HttpApiBuilder {
    /// Set the service base URL (e.g., "http://localhost:5000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the timeout for polls and the clear call (default: 3 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the timeout for reset requests (default: 120 seconds).
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpApi, ApiError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::Http(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:5000".to_string())
            .trim_end_matches('/')
            .to_string();
        let description = format!("http: {}", endpoint);

        Ok(HttpApi {
            client,
            endpoint,
            description,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            reset_timeout: self.reset_timeout.unwrap_or(DEFAULT_RESET_TIMEOUT),
        })
    }
}
