use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("source {source_name} did not finish within {timeout_secs}s")]
    Timeout {
        source_name: String,
        timeout_secs: u64,
    },

    #[error("page structure from {source_name} no longer matches: {reason}")]
    ParseMismatch { source_name: String, reason: String },

    #[error("invalid CSS selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("source {source_name} panicked: {message}")]
    Panicked {
        source_name: String,
        message: String,
    },
}

/// Coarse classification of why a source produced no deals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network failure, timeout, or non-2xx response.
    SourceUnavailable,
    /// The page was fetched but its markup no longer matches the selectors.
    ParseMismatch,
    /// The source itself is misconfigured (bad selector or URL template).
    Configuration,
    /// A bug in the adapter itself.
    Internal,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::SourceUnavailable => write!(f, "source_unavailable"),
            FailureKind::ParseMismatch => write!(f, "parse_mismatch"),
            FailureKind::Configuration => write!(f, "configuration"),
            FailureKind::Internal => write!(f, "internal"),
        }
    }
}

impl ScraperError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            ScraperError::Http(_)
            | ScraperError::RateLimited { .. }
            | ScraperError::UnexpectedStatus { .. }
            | ScraperError::Timeout { .. } => FailureKind::SourceUnavailable,
            ScraperError::ParseMismatch { .. } => FailureKind::ParseMismatch,
            ScraperError::InvalidSelector { .. } | ScraperError::InvalidUrl { .. } => {
                FailureKind::Configuration
            }
            ScraperError::Panicked { .. } => FailureKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_side_errors_are_source_unavailable() {
        let status = ScraperError::UnexpectedStatus {
            status: 503,
            url: "https://example.com".to_string(),
        };
        let timeout = ScraperError::Timeout {
            source_name: "slow".to_string(),
            timeout_secs: 5,
        };
        assert_eq!(status.kind(), FailureKind::SourceUnavailable);
        assert_eq!(timeout.kind(), FailureKind::SourceUnavailable);
    }

    #[test]
    fn markup_drift_is_parse_mismatch() {
        let err = ScraperError::ParseMismatch {
            source_name: "rfd".to_string(),
            reason: "no titles".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::ParseMismatch);
        assert_eq!(err.kind().to_string(), "parse_mismatch");
    }

    #[test]
    fn bad_selector_is_configuration() {
        let err = ScraperError::InvalidSelector {
            selector: "li[".to_string(),
            reason: "unexpected end".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Configuration);
    }
}
