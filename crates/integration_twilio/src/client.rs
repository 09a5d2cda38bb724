//! Twilio REST client
//!
//! Uses the 2010-04-01 API with HTTP basic auth (account SID and auth token)
//! and form-encoded request bodies.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::twiml;

/// Twilio API errors
#[derive(Debug, Error)]
pub enum TwilioError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {code} - {message}")]
    Api { code: i64, message: String },

    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),
}

/// Twilio client configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Account SID
    pub account_sid: String,
    /// Auth token
    pub auth_token: String,
    /// Sender number in E.164 form
    pub from_number: String,
    /// API base URL
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            base_url: "https://api.twilio.com".to_string(),
            timeout_ms: 15_000,
        }
    }
}

impl TwilioConfig {
    /// Whether all credentials are present
    pub fn is_complete(&self) -> bool {
        !self.account_sid.trim().is_empty()
            && !self.auth_token.trim().is_empty()
            && !self.from_number.trim().is_empty()
    }
}

/// Created message resource
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Created call resource
#[derive(Debug, Clone, Deserialize)]
pub struct CallResponse {
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

/// Client for the Twilio REST API
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: Client,
    config: TwilioConfig,
}

impl TwilioClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns `TwilioError::Configuration` if a credential is missing.
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioError> {
        if config.account_sid.trim().is_empty() {
            return Err(TwilioError::Configuration("account_sid is required".to_string()));
        }
        if config.auth_token.trim().is_empty() {
            return Err(TwilioError::Configuration("auth_token is required".to_string()));
        }
        if config.from_number.trim().is_empty() {
            return Err(TwilioError::Configuration("from_number is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    fn resource_url(&self, resource: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/{resource}.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    fn check_recipient(to: &str) -> Result<(), TwilioError> {
        let digits = to.strip_prefix('+').unwrap_or_default();
        if digits.len() < 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(TwilioError::InvalidPhoneNumber(to.to_string()));
        }
        Ok(())
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        resource: &str,
        form: &[(&str, &str)],
    ) -> Result<T, TwilioError> {
        let response = self
            .client
            .post(self.resource_url(resource))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let error = serde_json::from_str::<ApiErrorResponse>(&body).map_or_else(
            |_| TwilioError::Api {
                code: i64::from(status.as_u16()),
                message: body.clone(),
            },
            |e| TwilioError::Api {
                code: e.code.unwrap_or_else(|| i64::from(status.as_u16())),
                message: e.message,
            },
        );
        Err(error)
    }

    /// Send an SMS
    ///
    /// # Errors
    ///
    /// Returns an error for malformed recipients, transport failures and API
    /// rejections.
    #[instrument(skip(self, body), fields(to = %to, body_len = body.len()))]
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<MessageResponse, TwilioError> {
        Self::check_recipient(to)?;
        let response: MessageResponse = self
            .post_form(
                "Messages",
                &[("To", to), ("From", &self.config.from_number), ("Body", body)],
            )
            .await?;
        debug!(sid = %response.sid, "Twilio SMS queued");
        Ok(response)
    }

    /// Place an outbound call that plays the audio at `play_url`
    ///
    /// # Errors
    ///
    /// Returns an error for malformed recipients, transport failures and API
    /// rejections.
    #[instrument(skip(self), fields(to = %to))]
    pub async fn place_call(&self, to: &str, play_url: &str) -> Result<CallResponse, TwilioError> {
        Self::check_recipient(to)?;
        let twiml = twiml::play_response(play_url);
        let response: CallResponse = self
            .post_form(
                "Calls",
                &[("To", to), ("From", &self.config.from_number), ("Twiml", &twiml)],
            )
            .await?;
        debug!(sid = %response.sid, "Twilio call created");
        Ok(response)
    }

    /// Sender number used for outbound traffic
    pub fn from_number(&self) -> &str {
        &self.config.from_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            from_number: "+15550001111".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn requires_credentials() {
        assert!(matches!(
            TwilioClient::new(TwilioConfig::default()),
            Err(TwilioError::Configuration(_))
        ));
        let mut partial = config();
        partial.from_number = " ".to_string();
        assert!(!partial.is_complete());
        assert!(TwilioClient::new(partial).is_err());
    }

    #[test]
    fn resource_urls() {
        let client = TwilioClient::new(config()).unwrap();
        assert_eq!(
            client.resource_url("Messages"),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn recipient_must_be_e164() {
        assert!(TwilioClient::check_recipient("+919999900000").is_ok());
        assert!(TwilioClient::check_recipient("919999900000").is_err());
        assert!(TwilioClient::check_recipient("unknown").is_err());
        assert!(TwilioClient::check_recipient("+91-99").is_err());
    }
}
