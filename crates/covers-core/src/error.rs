use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoversError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("connection failure: {0}")]
    ConnectionFailure(String),
    #[error("gateway timeout: {0}")]
    GatewayTimeout(String),
    #[error("bad gateway: {0}")]
    BadGateway(String),
    #[error("too many attempts: {0}")]
    TooManyAttempts(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl CoversError {
    /// Proxy-side faults that the fetch loop absorbs and retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailure(_) | Self::GatewayTimeout(_) | Self::BadGateway(_)
        )
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::Config(_) => 500,
            Self::ConnectionFailure(_) | Self::BadGateway(_) => 502,
            Self::GatewayTimeout(_) => 504,
            Self::TooManyAttempts(_) => 429,
            Self::NotFound(_) => 404,
        }
    }
}

pub type CoversResult<T> = Result<T, CoversError>;

#[cfg(test)]
mod tests {
    use super::CoversError;

    #[test]
    fn only_proxy_faults_are_retryable() {
        assert!(CoversError::ConnectionFailure("refused".into()).is_retryable());
        assert!(CoversError::GatewayTimeout("70s".into()).is_retryable());
        assert!(CoversError::BadGateway("garbage".into()).is_retryable());

        assert!(!CoversError::InvalidInput("empty".into()).is_retryable());
        assert!(!CoversError::TooManyAttempts("3".into()).is_retryable());
        assert!(!CoversError::NotFound("nothing".into()).is_retryable());
        assert!(!CoversError::Config("bad".into()).is_retryable());
    }

    #[test]
    fn exhaustion_maps_to_rate_limited_status() {
        assert_eq!(CoversError::TooManyAttempts("3".into()).http_status(), 429);
        assert_eq!(CoversError::NotFound("x".into()).http_status(), 404);
        assert_eq!(CoversError::InvalidInput("x".into()).http_status(), 400);
        assert_eq!(CoversError::GatewayTimeout("x".into()).http_status(), 504);
    }
}
