//! Configuration for inference engines and translators

use serde::{Deserialize, Serialize};

/// Ollama inference server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Top-p (nucleus) sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "tinyllama:1.1b".to_string()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

const fn default_max_tokens() -> u32 {
    512
}

const fn default_temperature() -> f32 {
    0.2
}

const fn default_top_p() -> f32 {
    0.9
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

impl InferenceConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        validate_common(&self.base_url, self.timeout_ms, self.temperature)
    }
}

/// OpenAI-compatible chat completions API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChatConfig {
    /// API key; the engine is disabled without one
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (including `/v1`)
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for OpenAiChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl OpenAiChatConfig {
    /// Whether credentials are present
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.is_configured() {
            return Err("OpenAI API key is required".to_string());
        }
        validate_common(&self.base_url, self.timeout_ms, self.temperature)
    }
}

/// LibreTranslate-compatible translation server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibreTranslateConfig {
    /// Base URL of the server
    #[serde(default = "default_libre_base_url")]
    pub base_url: String,

    /// API key, if the server requires one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_translate_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_libre_base_url() -> String {
    "http://localhost:5000".to_string()
}

const fn default_translate_timeout_ms() -> u64 {
    15_000
}

impl Default for LibreTranslateConfig {
    fn default() -> Self {
        Self {
            base_url: default_libre_base_url(),
            api_key: None,
            timeout_ms: default_translate_timeout_ms(),
        }
    }
}

impl LibreTranslateConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        validate_common(&self.base_url, self.timeout_ms, 0.0)
    }
}

/// Translation through a language model prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmTranslatorConfig {
    /// Languages (ISO 639-1) the model is trusted to translate between
    #[serde(default = "default_llm_languages")]
    pub languages: Vec<String>,
}

fn default_llm_languages() -> Vec<String> {
    ["en", "ml", "hi", "ta", "kn", "te"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for LlmTranslatorConfig {
    fn default() -> Self {
        Self {
            languages: default_llm_languages(),
        }
    }
}

fn validate_common(base_url: &str, timeout_ms: u64, temperature: f32) -> Result<(), String> {
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(format!("Base URL must be http(s), got '{base_url}'"));
    }
    if timeout_ms == 0 {
        return Err("Timeout must be greater than 0".to_string());
    }
    if !(0.0..=2.0).contains(&temperature) {
        return Err(format!(
            "Temperature must be between 0.0 and 2.0, got {temperature}"
        ));
    }
    Ok(())
}
