//! Messaging adapter - Twilio SMS and playback calls, or a logging stub
//! when credentials are missing

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::{DeliveryMode, DeliveryReceipt, TextMessagingPort, VoiceMessagingPort};
use async_trait::async_trait;
use domain::CallerId;
use integration_twilio::{TwilioClient, TwilioConfig, TwilioError};
use tracing::{info, instrument, warn};

fn map_twilio_error(e: TwilioError) -> ApplicationError {
    match e {
        TwilioError::Configuration(msg) => ApplicationError::Configuration(msg),
        TwilioError::InvalidPhoneNumber(number) => {
            ApplicationError::InvalidInput(format!("not a dialable number: {number}"))
        },
        TwilioError::Api { code: 429, .. } => ApplicationError::RateLimited,
        other => ApplicationError::Notification(other.to_string()),
    }
}

/// Text and voice delivery through one Twilio account
///
/// Implements both messaging ports. Without a complete configuration every
/// action is logged and reported with a stub receipt.
#[derive(Clone)]
pub struct TwilioMessagingAdapter {
    client: Option<Arc<TwilioClient>>,
}

impl std::fmt::Debug for TwilioMessagingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioMessagingAdapter")
            .field("mode", &self.delivery_mode())
            .finish()
    }
}

impl TwilioMessagingAdapter {
    /// Live when `config` is complete, stub otherwise
    pub fn from_config(config: TwilioConfig) -> Result<Self, ApplicationError> {
        if !config.is_complete() {
            warn!("Twilio credentials incomplete, messaging runs in stub mode");
            return Ok(Self::stub());
        }
        let client = TwilioClient::new(config).map_err(map_twilio_error)?;
        info!(from = %client.from_number(), "Twilio messaging enabled");
        Ok(Self {
            client: Some(Arc::new(client)),
        })
    }

    /// Adapter that only logs
    pub const fn stub() -> Self {
        Self { client: None }
    }

    const fn delivery_mode(&self) -> DeliveryMode {
        if self.client.is_some() {
            DeliveryMode::Live
        } else {
            DeliveryMode::Stub
        }
    }
}

#[async_trait]
impl TextMessagingPort for TwilioMessagingAdapter {
    #[instrument(skip(self, body), fields(to = %to, body_len = body.len()))]
    async fn send_text(
        &self,
        to: &CallerId,
        body: &str,
    ) -> Result<DeliveryReceipt, ApplicationError> {
        let Some(client) = &self.client else {
            info!(body = %body, "SMS stub: message not sent");
            return Ok(DeliveryReceipt::stub());
        };

        let response = client
            .send_sms(to.as_str(), body)
            .await
            .map_err(map_twilio_error)?;
        Ok(DeliveryReceipt::live(response.sid))
    }

    fn mode(&self) -> DeliveryMode {
        self.delivery_mode()
    }
}

#[async_trait]
impl VoiceMessagingPort for TwilioMessagingAdapter {
    #[instrument(skip(self), fields(to = %to))]
    async fn play_audio(
        &self,
        to: &CallerId,
        play_url: &str,
    ) -> Result<DeliveryReceipt, ApplicationError> {
        let Some(client) = &self.client else {
            info!(play_url = %play_url, "Voice stub: call not placed");
            return Ok(DeliveryReceipt::stub());
        };

        let response = client
            .place_call(to.as_str(), play_url)
            .await
            .map_err(map_twilio_error)?;
        Ok(DeliveryReceipt::live(response.sid))
    }

    fn mode(&self) -> DeliveryMode {
        self.delivery_mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_config_is_stub() {
        let adapter = TwilioMessagingAdapter::from_config(TwilioConfig {
            account_sid: "AC1".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(TextMessagingPort::mode(&adapter), DeliveryMode::Stub);
        assert_eq!(VoiceMessagingPort::mode(&adapter), DeliveryMode::Stub);
    }

    #[tokio::test]
    async fn stub_returns_same_contract() {
        let adapter = TwilioMessagingAdapter::stub();
        let caller = CallerId::new("+91999").unwrap();

        let text = adapter.send_text(&caller, "hello").await.unwrap();
        assert_eq!(text, DeliveryReceipt::stub());

        let voice = adapter
            .play_audio(&caller, "http://localhost:8000/static/tts/tts_91999.mp3")
            .await
            .unwrap();
        assert!(!voice.delivered);
        assert_eq!(voice.mode, DeliveryMode::Stub);
    }

    #[test]
    fn twilio_errors_map_to_notification() {
        assert!(matches!(
            map_twilio_error(TwilioError::Api {
                code: 21211,
                message: "bad number".to_string()
            }),
            ApplicationError::Notification(_)
        ));
        assert!(matches!(
            map_twilio_error(TwilioError::Api {
                code: 429,
                message: "slow down".to_string()
            }),
            ApplicationError::RateLimited
        ));
    }
}
