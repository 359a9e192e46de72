//! Transport errors reported by issue clients

use thiserror::Error;

/// Errors that can occur while talking to GitHub
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("rate limited by GitHub: {0}")]
    RateLimited(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("GitHub API returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::RateLimited(_) | TransportError::Network(_) => true,
            TransportError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether GitHub refused the request before acting on it
    ///
    /// Only these errors are safe to retry for writes; anything else may
    /// have reached the server and produced a comment already.
    pub fn is_rejected_before_write(&self) -> bool {
        matches!(self, TransportError::RateLimited(_))
    }
}

impl From<octocrab::Error> for TransportError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                let message = source.message.clone();
                match status {
                    401 => TransportError::Auth(message),
                    429 => TransportError::RateLimited(message),
                    403 if message.to_lowercase().contains("rate limit") => {
                        TransportError::RateLimited(message)
                    }
                    _ => TransportError::Http { status, message },
                }
            }
            octocrab::Error::Serde { source, .. } => TransportError::Decode(source.to_string()),
            octocrab::Error::Json { source, .. } => TransportError::Decode(source.to_string()),
            other => TransportError::Network(other.to_string()),
        }
    }
}
