//! Application-level errors

use domain::DomainError;
use thiserror::Error;

use crate::provider_chain::ProviderChainExhausted;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Every provider of a capability failed
    #[error(transparent)]
    ChainExhausted(#[from] ProviderChainExhausted),

    /// Speech recognition or synthesis failed
    #[error("Speech error: {0}")]
    Speech(String),

    /// Inference/AI error
    #[error("Inference error: {0}")]
    Inference(String),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// The recording could not be fetched or decoded
    #[error("Audio acquisition failed: {0}")]
    AudioAcquisition(String),

    /// A translator cannot serve this language pair
    #[error("Translation unsupported: {source_lang} -> {target_lang}")]
    TranslationUnsupported {
        source_lang: String,
        target_lang: String,
    },

    /// Storing or reading records failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Delivering a message failed
    #[error("Notification failed: {0}")]
    Notification(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller supplied unusable input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The call queue is at capacity
    #[error("Call queue is full")]
    QueueFull,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ExternalService(_) | Self::QueueFull
        )
    }

    pub fn translation_unsupported(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::TranslationUnsupported {
            source_lang: source.into(),
            target_lang: target.into(),
        }
    }
}
