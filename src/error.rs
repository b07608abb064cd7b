use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single provider call.
///
/// Every variant means the provider is unavailable for this call. The
/// aggregator turns it into an offline status plus fallback data; it never
/// reaches the UI layer as an error value.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider}: request timed out after {timeout:?}")]
    Timeout {
        provider: &'static str,
        timeout: Duration,
    },

    #[error("{provider}: transport error: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider}: HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{provider}: credentials rejected (HTTP {status})")]
    AuthRejected {
        provider: &'static str,
        status: StatusCode,
    },

    #[error("{provider}: authentication failed: {reason}")]
    Auth {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider}: could not decode payload: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider}: not configured: {what}")]
    NotConfigured {
        provider: &'static str,
        what: &'static str,
    },
}

impl ProviderError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_transient_statuses() {
        let throttled = ProviderError::Status {
            provider: "tvmaze",
            status: StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
        };
        let bad_gateway = ProviderError::Status {
            provider: "tvmaze",
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        let not_found = ProviderError::Status {
            provider: "tvmaze",
            status: StatusCode::NOT_FOUND,
            body: String::new(),
        };
        assert!(throttled.is_transient());
        assert!(bad_gateway.is_transient());
        assert!(!not_found.is_transient());
        assert!(!ProviderError::AuthRejected {
            provider: "tvdb",
            status: StatusCode::UNAUTHORIZED
        }
        .is_transient());
    }

    #[test]
    fn message_names_the_provider() {
        let err = ProviderError::Timeout {
            provider: "tmdb",
            timeout: Duration::from_secs(10),
        };
        assert!(err.to_string().starts_with("tmdb:"));
    }
}
