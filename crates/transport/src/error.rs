use thiserror::Error;

/// Errors surfaced by [`CatalogApi`](crate::CatalogApi) implementations.
///
/// Variants carry rendered messages rather than the underlying client errors
/// so the type stays `Clone + PartialEq`; components store these in their
/// state (an upload's error detail, a view's failure message).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("request failed: {0}")]
    Request(String),
    /// The request exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// The server answered with a non-success status.
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),
    /// Client-side configuration is unusable (bad base URL, header value).
    #[error("invalid transport config: {0}")]
    InvalidConfig(String),
}

impl TransportError {
    /// Transient failures worth another attempt: connection trouble,
    /// timeouts, 408, 429 and any 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Request(_) | TransportError::Timeout(_) => true,
            TransportError::Status { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            TransportError::Decode(_) | TransportError::InvalidConfig(_) => false,
        }
    }

    /// HTTP status when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidConfig(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}
