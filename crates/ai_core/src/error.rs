//! Inference and translation errors

use thiserror::Error;

/// Errors that can occur during inference or translation
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Failed to connect to the server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the server failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Model not found or not loaded
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Response parsing failed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during inference
    #[error("Inference timeout after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The translator has no resource for this language pair
    #[error("Unsupported language pair: {source_lang} -> {target_lang}")]
    UnsupportedPair {
        source_lang: String,
        target_lang: String,
    },
}

impl InferenceError {
    /// Map a reqwest error, recording the configured timeout on timeouts
    pub fn from_reqwest(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }

    /// Create an unsupported pair error
    pub fn unsupported_pair(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::UnsupportedPair {
            source_lang: source.into(),
            target_lang: target.into(),
        }
    }

    /// Whether this error means the pair will never be served by this translator
    pub const fn is_unsupported_pair(&self) -> bool {
        matches!(self, Self::UnsupportedPair { .. })
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_reqwest(&err, 30_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message() {
        assert_eq!(
            InferenceError::Timeout(30000).to_string(),
            "Inference timeout after 30000ms"
        );
    }

    #[test]
    fn unsupported_pair_message() {
        let err = InferenceError::unsupported_pair("en", "xx");
        assert_eq!(err.to_string(), "Unsupported language pair: en -> xx");
        assert!(err.is_unsupported_pair());
        assert!(!InferenceError::RateLimited.is_unsupported_pair());
    }

    #[test]
    fn server_error_message() {
        let err = InferenceError::ServerError("Status 500".to_string());
        assert_eq!(err.to_string(), "Server error: Status 500");
    }
}
