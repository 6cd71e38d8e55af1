use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single chat-completions request.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The endpoint answered with a non-success status. The body is kept so
    /// callers can tell access problems apart.
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProviderError {
    /// Worth another attempt: rate limiting, server errors and transport
    /// failures. Other 4xx answers and undecodable bodies are final.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::Transport(e) => !e.is_decode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ProviderError {
        ProviderError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            body: String::new(),
        }
    }

    #[test]
    fn only_rate_limits_and_server_errors_are_retryable() {
        assert!(status(429).is_retryable());
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());

        assert!(!status(400).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!status(403).is_retryable());
        assert!(!status(404).is_retryable());
    }

    #[test]
    fn status_error_carries_the_body() {
        let err = ProviderError::Status {
            status: StatusCode::FORBIDDEN,
            body: "no aws-marketplace access".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 403 Forbidden: no aws-marketplace access");
    }
}
