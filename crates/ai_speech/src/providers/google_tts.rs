//! Google Cloud Text-to-Speech provider
//!
//! Calls `v1/text:synthesize` with an API key and decodes the base64 MP3
//! payload.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::GoogleTtsConfig;
use crate::error::SpeechError;
use crate::ports::TextToSpeech;
use crate::types::{AudioData, AudioFormat};

/// Google Cloud TTS provider
#[derive(Debug, Clone)]
pub struct GoogleCloudTtsProvider {
    client: Client,
    config: GoogleTtsConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

impl GoogleCloudTtsProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if no API key is configured.
    pub fn new(config: GoogleTtsConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Resolve the voice language: keep a region if given, otherwise use the
    /// configured voice language when it is the same language.
    fn voice_language<'a>(&'a self, language: &'a str) -> &'a str {
        if language.contains('-') {
            return language;
        }
        let configured = self.config.voice_language.as_str();
        let configured_primary = configured.split('-').next().unwrap_or(configured);
        if configured_primary.eq_ignore_ascii_case(language) {
            configured
        } else {
            language
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/text:synthesize",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl TextToSpeech for GoogleCloudTtsProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), language = %language))]
    async fn synthesize(&self, text: &str, language: &str) -> Result<AudioData, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::SynthesisFailed("Text is empty".to_string()));
        }

        let voice_language = self.voice_language(language);
        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: voice_language,
                name: if voice_language == self.config.voice_language {
                    self.config.voice_name.as_deref()
                } else {
                    None
                },
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_deref().unwrap_or_default())])
            .json(&request)
            .send()
            .await
            .map_err(|e| SpeechError::from_reqwest(&e, self.config.timeout_ms))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SpeechError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleError>(&body)
                .map_or_else(|_| format!("HTTP {status}: {body}"), |e| e.error.message);
            return Err(SpeechError::SynthesisFailed(message));
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let audio = STANDARD
            .decode(body.audio_content.as_bytes())
            .map_err(|e| SpeechError::InvalidResponse(format!("Invalid base64 audio: {e}")))?;
        if audio.is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Service returned no audio".to_string(),
            ));
        }

        debug!(audio_size = audio.len(), voice_language, "Google Cloud TTS complete");
        Ok(AudioData::new(audio, AudioFormat::Mp3))
    }

    fn provider_name(&self) -> &'static str {
        "google_cloud"
    }
}
