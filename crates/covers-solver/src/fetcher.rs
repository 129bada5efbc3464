use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use covers_config::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_TIMEOUT_MS, Settings};
use covers_core::{CoversError, CoversResult};
use tracing::{debug, warn};
use url::Url;

use crate::transport::{FlareSolverrTransport, SolveRequest, SolverTransport, decode_solution};

/// Waits between attempts. Swapped out in tests so no wall-clock time passes.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    pub max_attempts: u32,
    /// Delay after attempt `n` is `base_delay * n`.
    pub base_delay: Duration,
    pub max_timeout_ms: u64,
}

impl FetchPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            base_delay: settings.base_delay,
            max_timeout_ms: settings.max_timeout_ms,
        }
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_timeout_ms: DEFAULT_MAX_TIMEOUT_MS,
        }
    }
}

/// Fetches rendered HTML through the solving proxy with bounded, linearly growing backoff.
///
/// Every call goes to the network. Concurrent calls for the same URL are independent.
#[derive(Clone)]
pub struct ResilientFetcher {
    transport: Arc<dyn SolverTransport>,
    delay: Arc<dyn Delay>,
    base_origin: Url,
    policy: FetchPolicy,
}

impl ResilientFetcher {
    pub fn new(
        transport: Arc<dyn SolverTransport>,
        delay: Arc<dyn Delay>,
        base_origin: &str,
        policy: FetchPolicy,
    ) -> CoversResult<Self> {
        let base_origin = Url::parse(base_origin)
            .map_err(|err| CoversError::Config(format!("invalid site origin: {err}")))?;
        Ok(Self {
            transport,
            delay,
            base_origin,
            policy,
        })
    }

    pub fn from_settings(settings: &Settings) -> CoversResult<Self> {
        let transport = FlareSolverrTransport::from_settings(settings)?;
        Self::new(
            Arc::new(transport),
            Arc::new(TokioDelay),
            &settings.site_origin,
            FetchPolicy::from_settings(settings),
        )
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    pub fn base_origin(&self) -> &Url {
        &self.base_origin
    }

    /// Resolves site-relative paths against the base origin; absolute URLs pass through.
    pub fn resolve_url(&self, url: &str) -> CoversResult<String> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Url::parse(url)
                .map(String::from)
                .map_err(|err| CoversError::InvalidInput(format!("invalid url: {err}")));
        }
        self.base_origin
            .join(url)
            .map(String::from)
            .map_err(|err| CoversError::InvalidInput(format!("invalid url '{url}': {err}")))
    }

    pub async fn fetch(&self, url: &str) -> CoversResult<String> {
        self.fetch_with_attempts(url, self.policy.max_attempts).await
    }

    pub async fn fetch_with_attempts(&self, url: &str, max_attempts: u32) -> CoversResult<String> {
        let max_attempts = max_attempts.max(1);
        let target = self.resolve_url(url)?;
        let request = SolveRequest::get(target.clone(), self.policy.max_timeout_ms);

        let mut last_error = None;
        for attempt in 1..=max_attempts {
            debug!(url = %target, attempt, max_attempts, "fetching via solver");

            let outcome = match self.transport.send(&request).await {
                Ok(body) => decode_solution(&body),
                Err(err) => Err(err),
            };

            let err = match outcome {
                Ok(html) => return Ok(html),
                Err(err) if err.is_retryable() => err,
                Err(err) => return Err(err),
            };

            if attempt < max_attempts {
                let delay = self.policy.delay_after(attempt);
                warn!(
                    url = %target,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "solver attempt failed, retrying"
                );
                self.delay.wait(delay).await;
            } else {
                warn!(url = %target, attempt, max_attempts, error = %err, "solver attempt failed");
            }
            last_error = Some(err);
        }

        let last = last_error.map_or_else(|| "no attempt made".to_string(), |err| err.to_string());
        Err(CoversError::TooManyAttempts(format!(
            "gave up on {target} after {max_attempts} attempts; last error: {last}"
        )))
    }
}
