//! # Provider Errors

use thiserror::Error;

/// Result type for collaborator calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failures talking to a remote collaborator
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection, TLS, timeout or body decoding failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Response arrived but could not be understood
    #[error("Unexpected response from {service}: {detail}")]
    Malformed {
        service: &'static str,
        detail: String,
    },

    /// Required credential not present in the environment
    #[error("Missing API key: set {0}")]
    MissingApiKey(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn malformed(service: &'static str, detail: impl ToString) -> Self {
        ProviderError::Malformed {
            service,
            detail: detail.to_string(),
        }
    }
}
