//! Provider configuration
//!
//! Each provider has its own section so that the application can enable
//! them independently and order them in a fallback chain.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// OpenAI Whisper speech recognition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSttConfig {
    /// API key; the provider is disabled without one
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Whisper model name
    #[serde(default = "default_stt_model")]
    pub model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upload size limit of the endpoint
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

const fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

impl Default for OpenAiSttConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_stt_model(),
            timeout_ms: default_timeout_ms(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl OpenAiSttConfig {
    /// Whether credentials are present
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.is_configured() {
            return Err("OpenAI API key is required".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }
        if self.max_upload_bytes == 0 {
            return Err("Upload limit must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Local whisper.cpp recognition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppConfig {
    /// Path to the whisper.cpp CLI
    #[serde(default = "default_whisper_executable")]
    pub executable_path: PathBuf,

    /// Path to the GGML model file
    #[serde(default = "default_whisper_model")]
    pub model_path: PathBuf,

    /// Worker threads passed to whisper.cpp
    #[serde(default = "default_threads")]
    pub threads: u32,
}

fn default_whisper_executable() -> PathBuf {
    PathBuf::from("whisper-cli")
}

fn default_whisper_model() -> PathBuf {
    PathBuf::from("models/ggml-small.bin")
}

const fn default_threads() -> u32 {
    4
}

impl Default for WhisperCppConfig {
    fn default() -> Self {
        Self {
            executable_path: default_whisper_executable(),
            model_path: default_whisper_model(),
            threads: default_threads(),
        }
    }
}

impl WhisperCppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.executable_path.as_os_str().is_empty() {
            return Err("whisper.cpp executable path must not be empty".to_string());
        }
        if self.model_path.as_os_str().is_empty() {
            return Err("whisper.cpp model path must not be empty".to_string());
        }
        if self.threads == 0 {
            return Err("Thread count must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Google Cloud Text-to-Speech
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTtsConfig {
    /// API key; the provider is disabled without one
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_google_tts_base_url")]
    pub base_url: String,

    /// Voice language code used when the caller language has no region
    #[serde(default = "default_voice_language")]
    pub voice_language: String,

    /// Specific voice name, service default when absent
    #[serde(default)]
    pub voice_name: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_google_tts_base_url() -> String {
    "https://texttospeech.googleapis.com".to_string()
}

fn default_voice_language() -> String {
    "ml-IN".to_string()
}

impl Default for GoogleTtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_google_tts_base_url(),
            voice_language: default_voice_language(),
            voice_name: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl GoogleTtsConfig {
    /// Whether credentials are present
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.is_configured() {
            return Err("Google Cloud API key is required".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Google Translate speech endpoint (the service behind gTTS)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GttsConfig {
    /// Service base URL
    #[serde(default = "default_gtts_base_url")]
    pub base_url: String,

    /// Maximum characters per request; longer text is split on word boundaries
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_gtts_base_url() -> String {
    "https://translate.google.com".to_string()
}

const fn default_chunk_chars() -> usize {
    100
}

impl Default for GttsConfig {
    fn default() -> Self {
        Self {
            base_url: default_gtts_base_url(),
            chunk_chars: default_chunk_chars(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl GttsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_chars < 10 {
            return Err(format!(
                "Chunk size must be at least 10 characters, got {}",
                self.chunk_chars
            ));
        }
        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_requires_api_key() {
        let config = OpenAiSttConfig::default();
        assert!(!config.is_configured());
        assert!(config.validate().is_err());

        let config = OpenAiSttConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_api_key_is_not_configured() {
        let config = GoogleTtsConfig {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn whisper_cpp_rejects_zero_threads() {
        let config = WhisperCppConfig {
            threads: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(WhisperCppConfig::default().validate().is_ok());
    }

    #[test]
    fn gtts_rejects_tiny_chunks() {
        let config = GttsConfig {
            chunk_chars: 5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(GttsConfig::default().validate().is_ok());
    }

    #[test]
    fn sections_deserialize_with_defaults() {
        let config: GoogleTtsConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.voice_language, "ml-IN");
        assert_eq!(config.timeout_ms, 30_000);
    }
}
