use serde::{Deserialize, Serialize};

pub const DEFAULT_SOLVER_URL: &str = "http://flaresolverr:8191/v1";
pub const DEFAULT_SITE_ORIGIN: &str = "https://www.whosampled.com";
pub const DEFAULT_MAX_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 70;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 2_000;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SolverConfig {
    pub url: Option<String>,
    /// Render budget handed to the proxy.
    pub max_timeout_ms: Option<u64>,
    /// Bound on our own HTTP call; must outlast `max_timeout_ms`.
    pub call_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SiteConfig {
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FetchConfig {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    pub json: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogConfig {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CoversConfig {
    pub solver: SolverConfig,
    pub site: SiteConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
}
