use std::time::Duration;

use async_trait::async_trait;
use covers_config::Settings;
use covers_core::{CoversError, CoversResult, validate_url};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SOLVE_COMMAND: &str = "request.get";

/// Body of a solve call: ask the proxy to navigate to `url` in a real browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveRequest {
    pub cmd: &'static str,
    pub url: String,
    #[serde(rename = "maxTimeout")]
    pub max_timeout: u64,
}

impl SolveRequest {
    pub fn get(url: impl Into<String>, max_timeout_ms: u64) -> Self {
        Self {
            cmd: SOLVE_COMMAND,
            url: url.into(),
            max_timeout: max_timeout_ms,
        }
    }
}

/// One request/response exchange with the solving proxy.
///
/// Implementations return the raw response body; envelope decoding happens in the fetcher.
/// Transport faults must be reported as `ConnectionFailure`, `GatewayTimeout` or `BadGateway`.
#[async_trait]
pub trait SolverTransport: Send + Sync {
    async fn send(&self, request: &SolveRequest) -> CoversResult<String>;
}

#[derive(Debug, Clone)]
pub struct FlareSolverrTransport {
    client: Client,
    endpoint: String,
}

impl FlareSolverrTransport {
    pub fn new(endpoint: impl Into<String>, call_timeout: Duration) -> CoversResult<Self> {
        let endpoint = endpoint.into();
        validate_url(&endpoint)?;
        let client = Client::builder()
            .user_agent("covers/0.1")
            .timeout(call_timeout)
            .build()
            .map_err(|err| CoversError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self { client, endpoint })
    }

    pub fn from_settings(settings: &Settings) -> CoversResult<Self> {
        Self::new(settings.solver_url.clone(), settings.call_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SolverTransport for FlareSolverrTransport {
    async fn send(&self, request: &SolveRequest) -> CoversResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    CoversError::GatewayTimeout(format!("solver request timed out: {err}"))
                } else {
                    CoversError::ConnectionFailure(format!("solver connection error: {err}"))
                }
            })?;

        // The proxy reports its own failures inside a JSON body with a 5xx status,
        // so the status line is informational only.
        let status = response.status();
        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                CoversError::GatewayTimeout(format!("solver response timed out: {err}"))
            } else {
                CoversError::BadGateway(format!("failed to read solver response: {err}"))
            }
        })?;

        debug!(status = status.as_u16(), bytes = body.len(), "solver responded");
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct SolverEnvelope {
    status: Option<String>,
    message: Option<String>,
    solution: Option<Solution>,
}

#[derive(Debug, Deserialize)]
struct Solution {
    status: Option<u16>,
    url: Option<String>,
    response: Option<String>,
}

/// Pulls the rendered document out of a solver response body.
pub fn decode_solution(body: &str) -> CoversResult<String> {
    let envelope: SolverEnvelope = serde_json::from_str(body)
        .map_err(|err| CoversError::BadGateway(format!("invalid solver response: {err}")))?;

    let message = envelope.message.as_deref().unwrap_or("Unknown error");
    if envelope.status.as_deref() != Some("ok") {
        return Err(CoversError::BadGateway(format!("solver error: {message}")));
    }

    let solution = envelope
        .solution
        .ok_or_else(|| CoversError::BadGateway(format!("solver error: {message}")))?;

    debug!(
        origin_status = solution.status,
        final_url = solution.url.as_deref().unwrap_or(""),
        "solver returned a solution"
    );

    solution
        .response
        .ok_or_else(|| CoversError::BadGateway("solver solution has no response body".to_string()))
}
