//! LibreTranslate-compatible HTTP translator

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::registry::PairRegistry;
use crate::config::LibreTranslateConfig;
use crate::error::InferenceError;
use crate::ports::Translator;

/// A pair the server advertised support for
#[derive(Debug)]
struct SupportedPair;

/// Translator backed by a LibreTranslate server
///
/// Pair support is probed through `/languages` the first time a pair is used.
pub struct LibreTranslator {
    client: Client,
    config: LibreTranslateConfig,
    pairs: Arc<PairRegistry<SupportedPair>>,
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    code: String,
    #[serde(default)]
    targets: Vec<String>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct LibreErrorBody {
    error: String,
}

impl LibreTranslator {
    /// Create a new translator
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::Configuration` for invalid settings.
    pub fn new(config: LibreTranslateConfig) -> Result<Self, InferenceError> {
        config.validate().map_err(InferenceError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed(e.to_string()))?;

        info!(base_url = %config.base_url, "Initialized LibreTranslate translator");

        Ok(Self {
            client,
            config,
            pairs: Arc::new(PairRegistry::new()),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    async fn probe(&self, source: &str, target: &str) -> Result<Option<SupportedPair>, InferenceError> {
        let response = self
            .client
            .get(self.url("languages"))
            .send()
            .await
            .map_err(|e| InferenceError::from_reqwest(&e, self.config.timeout_ms))?;

        if !response.status().is_success() {
            return Err(InferenceError::ServerError(format!(
                "Language probe returned {}",
                response.status()
            )));
        }

        let languages: Vec<LanguageEntry> = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let supported = languages
            .iter()
            .find(|l| l.code == source)
            .is_some_and(|l| l.targets.iter().any(|t| t == target));

        debug!(source, target, supported, "Probed LibreTranslate pair");
        Ok(supported.then_some(SupportedPair))
    }
}

#[async_trait]
impl Translator for LibreTranslator {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, InferenceError> {
        let supported = self
            .pairs
            .get_or_load(source, target, || self.probe(source, target))
            .await?;
        if supported.is_none() {
            return Err(InferenceError::unsupported_pair(source, target));
        }

        let request = TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.config.api_key.as_deref(),
        };

        let response = self
            .client
            .post(self.url("translate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::from_reqwest(&e, self.config.timeout_ms))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(InferenceError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<LibreErrorBody>(&body)
                .map_or_else(|_| format!("Status {status}: {body}"), |e| e.error);
            warn!(%status, "LibreTranslate request failed");
            return Err(InferenceError::ServerError(message));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        Ok(parsed.translated_text)
    }

    fn translator_name(&self) -> &'static str {
        "libretranslate"
    }

    fn shutdown(&self) {
        self.pairs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_is_omitted_when_absent() {
        let request = TranslateRequest {
            q: "hello",
            source: "en",
            target: "ml",
            format: "text",
            api_key: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["format"], "text");
        assert!(json.get("api_key").is_none());
    }

    #[test]
    fn parses_translated_text() {
        let parsed: TranslateResponse =
            serde_json::from_str(r#"{"translatedText":"നമസ്കാരം"}"#).unwrap();
        assert_eq!(parsed.translated_text, "നമസ്കാരം");
    }
}
