mod error;
mod result;

pub use error::{CoversError, CoversResult};
pub use result::{CoverInfo, CoverRelation, PaginationInfo, RelationKind, ScrapeResult, TrackInfo};

pub fn validate_url(url: &str) -> CoversResult<()> {
    url::Url::parse(url).map_err(|err| CoversError::InvalidInput(format!("invalid url: {err}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_url;
    use crate::CoversError;

    #[test]
    fn test_validate_url_accepts_solver_endpoints() {
        assert!(validate_url("http://flaresolverr:8191/v1").is_ok());
        assert!(validate_url("https://www.whosampled.com").is_ok());
    }

    #[test]
    fn test_validate_url_error_message() {
        assert!(matches!(
            validate_url("not-a-url"),
            Err(CoversError::InvalidInput(_))
        ));

        match validate_url("://no-scheme") {
            Err(CoversError::InvalidInput(msg)) => assert!(msg.contains("invalid url")),
            _ => panic!("Expected InvalidInput error"),
        }
    }
}
