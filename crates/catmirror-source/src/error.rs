use thiserror::Error;

/// Errors returned by the inventory API client.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No bearer token was configured; nothing was sent.
    #[error("source API token is not configured (set MS_TOKEN)")]
    MissingToken,

    /// The token contains characters that cannot appear in a header value.
    #[error("source API token is not a valid header value")]
    InvalidToken,

    #[error("invalid source URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// The body was not valid JSON or did not have the expected shape.
    #[error("failed to parse {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached for {endpoint}: exceeded {max_pages} pages")]
    PaginationLimit { endpoint: String, max_pages: usize },
}

impl SourceError {
    /// Configuration problems that are detected before any request is sent.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SourceError::MissingToken | SourceError::InvalidToken | SourceError::InvalidUrl { .. }
        )
    }

    /// Transport failures and non-2xx answers.
    #[must_use]
    pub fn is_http_failure(&self) -> bool {
        matches!(self, SourceError::Http(_) | SourceError::Status { .. })
    }

    #[must_use]
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, SourceError::Parse { .. })
    }
}
