//! Ollama chat client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{InferenceEngine, InferenceRequest, InferenceResponse, TokenUsage};

/// Inference engine backed by a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaInferenceEngine {
    client: Client,
    config: InferenceConfig,
}

impl OllamaInferenceEngine {
    /// Create a new engine
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::Configuration` for invalid settings and
    /// `InferenceError::ConnectionFailed` if the HTTP client cannot be built.
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        config.validate().map_err(InferenceError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            "Initialized Ollama inference engine"
        );

        Ok(Self { client, config })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/api/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn resolve_model<'a>(&'a self, request: &'a InferenceRequest) -> &'a str {
        request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model)
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: OllamaResponseMessage,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaModelsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

#[async_trait]
impl InferenceEngine for OllamaInferenceEngine {
    #[instrument(skip(self, request), fields(model = %self.resolve_model(&request)))]
    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        let body = OllamaChatRequest {
            model: self.resolve_model(&request),
            messages: request
                .messages
                .iter()
                .map(|m| OllamaMessage {
                    role: &m.role,
                    content: &m.content,
                })
                .collect(),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature.unwrap_or(self.config.temperature),
                num_predict: request.max_tokens.unwrap_or(self.config.max_tokens),
                top_p: self.config.top_p,
            },
        };

        debug!("Sending chat request to Ollama");

        let response = self
            .client
            .post(self.api_url("chat"))
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::from_reqwest(&e, self.config.timeout_ms))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            let text = response.text().await.unwrap_or_default();
            return Err(InferenceError::ModelNotAvailable(text));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, body = %text, "Ollama request failed");
            return Err(InferenceError::ServerError(format!("Status {status}: {text}")));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let usage = match (parsed.prompt_eval_count, parsed.eval_count) {
            (Some(prompt), Some(completion)) => Some(TokenUsage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }),
            _ => None,
        };

        debug!(tokens = ?usage, "Ollama inference completed");

        let finish_reason = parsed
            .done_reason
            .or_else(|| parsed.done.then(|| "stop".to_string()));

        Ok(InferenceResponse {
            content: parsed.message.content,
            model: parsed.model,
            usage,
            finish_reason,
        })
    }

    async fn is_healthy(&self) -> bool {
        match self.client.get(self.api_url("tags")).send().await {
            Ok(response) if response.status().is_success() => response
                .json::<OllamaModelsResponse>()
                .await
                .is_ok_and(|models| {
                    models
                        .models
                        .iter()
                        .any(|m| m.name == self.config.default_model)
                }),
            Ok(response) => {
                debug!(status = %response.status(), "Ollama health check failed");
                false
            },
            Err(e) => {
                debug!(error = %e, "Ollama unreachable");
                false
            },
        }
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    fn engine_name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_cleanly() {
        let engine = OllamaInferenceEngine::new(InferenceConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(engine.api_url("/chat"), "http://localhost:11434/api/chat");
    }

    #[test]
    fn request_model_overrides_default() {
        let engine = OllamaInferenceEngine::new(InferenceConfig::default()).unwrap();
        let mut request = InferenceRequest::simple("hi");
        assert_eq!(engine.resolve_model(&request), "tinyllama:1.1b");
        request.model = Some("llama3".to_string());
        assert_eq!(engine.resolve_model(&request), "llama3");
    }

    #[test]
    fn rejects_invalid_config() {
        let result = OllamaInferenceEngine::new(InferenceConfig {
            timeout_ms: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(InferenceError::Configuration(_))));
    }
}
