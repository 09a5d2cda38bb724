//! OpenAI Whisper speech recognition
//!
//! Uses `/audio/translations` in recognize-and-translate mode (output is
//! always English) and `/audio/transcriptions` otherwise. Responses are
//! requested as `verbose_json` so the segment log-probabilities can be
//! turned into a confidence score.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::OpenAiSttConfig;
use crate::error::SpeechError;
use crate::ports::SpeechToText;
use crate::types::{AudioData, TranscribeOptions, Transcription};

/// OpenAI Whisper STT provider
#[derive(Debug, Clone)]
pub struct OpenAiWhisperProvider {
    client: Client,
    config: OpenAiSttConfig,
}

impl OpenAiWhisperProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the API key is missing or the
    /// HTTP client cannot be built.
    pub fn new(config: OpenAiSttConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    fn endpoint(&self, options: &TranscribeOptions) -> String {
        let path = if options.translate_to_english {
            "audio/translations"
        } else {
            "audio/transcriptions"
        };
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn map_api_error(&self, status: reqwest::StatusCode, body: &str) -> SpeechError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return SpeechError::RateLimited;
        }
        if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
            return match api_error.error.code.as_deref() {
                Some("rate_limit_exceeded") => SpeechError::RateLimited,
                Some("model_not_found") => SpeechError::NotAvailable(format!(
                    "model '{}' not available",
                    self.config.model
                )),
                _ => SpeechError::TranscriptionFailed(api_error.error.message),
            };
        }
        SpeechError::TranscriptionFailed(format!("HTTP {status}: {body}"))
    }
}

/// `verbose_json` response body
#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    avg_logprob: f64,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    code: Option<String>,
}

/// Mean segment probability, `exp(mean(avg_logprob))`
#[allow(clippy::cast_precision_loss)]
fn confidence_from_segments(segments: &[WhisperSegment]) -> Option<f64> {
    if segments.is_empty() {
        return None;
    }
    let mean = segments.iter().map(|s| s.avg_logprob).sum::<f64>() / segments.len() as f64;
    Some(mean.exp().clamp(0.0, 1.0))
}

#[async_trait]
impl SpeechToText for OpenAiWhisperProvider {
    #[instrument(skip(self, audio, options), fields(
        audio_size = audio.size_bytes(),
        format = %audio.format(),
        translate = options.translate_to_english
    ))]
    async fn transcribe(
        &self,
        audio: &AudioData,
        options: &TranscribeOptions,
    ) -> Result<Transcription, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }
        if audio.size_bytes() > self.config.max_upload_bytes {
            return Err(SpeechError::AudioTooLarge {
                size_bytes: audio.size_bytes(),
                max_bytes: self.config.max_upload_bytes,
            });
        }
        if !audio.format().is_whisper_supported() {
            return Err(SpeechError::InvalidAudio(format!(
                "Audio format {} is not supported by Whisper",
                audio.format()
            )));
        }

        let file_part = Part::bytes(audio.data().to_vec())
            .file_name(audio.filename("recording"))
            .mime_str(audio.mime_type())
            .map_err(|e| SpeechError::InvalidAudio(format!("Invalid MIME type: {e}")))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json");
        // the translations endpoint has no language parameter
        if !options.translate_to_english {
            if let Some(lang) = &options.language_hint {
                form = form.text("language", lang.clone());
            }
        }

        let response = self
            .client
            .post(self.endpoint(options))
            .bearer_auth(self.api_key())
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechError::from_reqwest(&e, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.map_api_error(status, &body));
        }

        let body: WhisperResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        debug!(
            text_len = body.text.len(),
            language = ?body.language,
            segments = body.segments.len(),
            "Whisper recognition complete"
        );

        let mut transcription = Transcription::new(body.text.trim());
        if let Some(lang) = body.language {
            transcription = transcription.with_language(lang);
        }
        if let Some(confidence) = confidence_from_segments(&body.segments) {
            transcription = transcription.with_confidence(confidence);
        }
        if let Some(duration) = body.duration {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let duration_ms = (duration * 1000.0) as u64;
            transcription = transcription.with_duration(duration_ms);
        }

        Ok(transcription)
    }

    async fn is_available(&self) -> bool {
        let models_url = format!("{}/models", self.config.base_url.trim_end_matches('/'));
        self.client
            .get(models_url)
            .bearer_auth(self.api_key())
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OpenAiSttConfig {
        OpenAiSttConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://localhost:1/v1/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn requires_api_key() {
        assert!(OpenAiWhisperProvider::new(OpenAiSttConfig::default()).is_err());
    }

    #[test]
    fn endpoint_depends_on_mode() {
        let provider = OpenAiWhisperProvider::new(config()).unwrap();
        assert_eq!(
            provider.endpoint(&TranscribeOptions::translate(None)),
            "http://localhost:1/v1/audio/translations"
        );
        assert_eq!(
            provider.endpoint(&TranscribeOptions::default()),
            "http://localhost:1/v1/audio/transcriptions"
        );
    }

    #[test]
    fn confidence_is_mean_probability() {
        let segments = vec![
            WhisperSegment { avg_logprob: 0.0 },
            WhisperSegment { avg_logprob: 0.0 },
        ];
        let c = confidence_from_segments(&segments).unwrap();
        assert!((c - 1.0).abs() < 1e-9);

        let segments = vec![WhisperSegment {
            avg_logprob: (0.5f64).ln(),
        }];
        let c = confidence_from_segments(&segments).unwrap();
        assert!((c - 0.5).abs() < 1e-9);

        assert!(confidence_from_segments(&[]).is_none());
    }

    #[test]
    fn rate_limit_status_maps_to_rate_limited() {
        let provider = OpenAiWhisperProvider::new(config()).unwrap();
        let err = provider.map_api_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, SpeechError::RateLimited));
    }

    #[test]
    fn api_error_message_is_surfaced() {
        let provider = OpenAiWhisperProvider::new(config()).unwrap();
        let err = provider.map_api_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"bad file","code":null}}"#,
        );
        assert_eq!(err.to_string(), "Transcription failed: bad file");
    }
}
