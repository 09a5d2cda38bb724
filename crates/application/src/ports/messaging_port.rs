//! Messaging ports - text and voice delivery to the caller

use async_trait::async_trait;
use domain::CallerId;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use crate::error::ApplicationError;

/// Whether a channel talks to a real provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    Live,
    /// Credentials missing; the action is only recorded
    Stub,
}

/// Result of handing a message to a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub mode: DeliveryMode,
    /// `true` only when a live provider accepted the message
    pub delivered: bool,
    /// Provider message or call id
    pub reference: Option<String>,
}

impl DeliveryReceipt {
    pub fn live(reference: impl Into<String>) -> Self {
        Self {
            mode: DeliveryMode::Live,
            delivered: true,
            reference: Some(reference.into()),
        }
    }

    pub const fn stub() -> Self {
        Self {
            mode: DeliveryMode::Stub,
            delivered: false,
            reference: None,
        }
    }
}

/// Port for the text (SMS) channel
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TextMessagingPort: Send + Sync {
    async fn send_text(&self, to: &CallerId, body: &str) -> Result<DeliveryReceipt, ApplicationError>;

    fn mode(&self) -> DeliveryMode;
}

/// Port for the voice (playback call) channel
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VoiceMessagingPort: Send + Sync {
    async fn play_audio(
        &self,
        to: &CallerId,
        play_url: &str,
    ) -> Result<DeliveryReceipt, ApplicationError>;

    fn mode(&self) -> DeliveryMode;
}
