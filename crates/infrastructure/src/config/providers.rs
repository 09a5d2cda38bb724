//! External provider configuration: speech, language models, translation,
//! synthesis, messaging and the knowledge corpus.

use std::path::PathBuf;

use ai_core::{InferenceConfig, LibreTranslateConfig, LlmTranslatorConfig, OpenAiChatConfig};
use ai_speech::{GoogleTtsConfig, GttsConfig, OpenAiSttConfig, WhisperCppConfig};
use integration_twilio::TwilioConfig;
use serde::{Deserialize, Serialize};

/// ASR provider ids
pub const ASR_PROVIDERS: &[&str] = &["whisper_cpp", "openai"];
/// Answering provider ids
pub const ANSWER_PROVIDERS: &[&str] = &["openai", "ollama"];
/// Translation provider ids
pub const TRANSLATION_PROVIDERS: &[&str] = &["libretranslate", "llm"];
/// Synthesis provider ids
pub const TTS_PROVIDERS: &[&str] = &["google", "gtts"];

fn order(ids: &[&str]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}

/// Speech recognition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechAppConfig {
    /// Provider ids in priority order
    #[serde(default = "default_asr_order")]
    pub order: Vec<String>,

    #[serde(default)]
    pub openai: OpenAiSttConfig,

    #[serde(default)]
    pub whisper_cpp: WhisperCppConfig,

    /// FFmpeg binary used for canonical conversion (PATH lookup when unset)
    #[serde(default)]
    pub ffmpeg_path: Option<String>,

    /// Largest recording accepted from a fetch
    #[serde(default = "default_max_recording_bytes")]
    pub max_recording_bytes: usize,

    /// Recording download timeout in milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Directory that `file://` and bare-path recordings must live under
    /// (local references are refused when unset)
    #[serde(default)]
    pub local_recordings_dir: Option<PathBuf>,
}

fn default_asr_order() -> Vec<String> {
    order(ASR_PROVIDERS)
}

const fn default_max_recording_bytes() -> usize {
    25 * 1024 * 1024
}

const fn default_fetch_timeout_ms() -> u64 {
    30_000
}

impl Default for SpeechAppConfig {
    fn default() -> Self {
        Self {
            order: default_asr_order(),
            openai: OpenAiSttConfig::default(),
            whisper_cpp: WhisperCppConfig::default(),
            ffmpeg_path: None,
            max_recording_bytes: default_max_recording_bytes(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            local_recordings_dir: None,
        }
    }
}

/// Language models used for answering (and LLM translation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceAppConfig {
    #[serde(default = "default_answer_order")]
    pub order: Vec<String>,

    #[serde(default)]
    pub ollama: InferenceConfig,

    #[serde(default)]
    pub openai: OpenAiChatConfig,
}

fn default_answer_order() -> Vec<String> {
    order(ANSWER_PROVIDERS)
}

impl Default for InferenceAppConfig {
    fn default() -> Self {
        Self {
            order: default_answer_order(),
            ollama: InferenceConfig::default(),
            openai: OpenAiChatConfig::default(),
        }
    }
}

/// Answer translation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationAppConfig {
    #[serde(default = "default_translation_order")]
    pub order: Vec<String>,

    #[serde(default)]
    pub libretranslate: LibreTranslateConfig,

    #[serde(default)]
    pub llm: LlmTranslatorConfig,
}

fn default_translation_order() -> Vec<String> {
    order(TRANSLATION_PROVIDERS)
}

impl Default for TranslationAppConfig {
    fn default() -> Self {
        Self {
            order: default_translation_order(),
            libretranslate: LibreTranslateConfig::default(),
            llm: LlmTranslatorConfig::default(),
        }
    }
}

/// Speech synthesis and the served artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsAppConfig {
    #[serde(default = "default_tts_order")]
    pub order: Vec<String>,

    #[serde(default)]
    pub google: GoogleTtsConfig,

    #[serde(default)]
    pub gtts: GttsConfig,

    /// Directory synthesized audio is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// URL prefix the output directory is reachable at
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_tts_order() -> Vec<String> {
    order(TTS_PROVIDERS)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/tmp/tts")
}

fn default_public_base_url() -> String {
    "http://localhost:8000/static/tts".to_string()
}

impl Default for TtsAppConfig {
    fn default() -> Self {
        Self {
            order: default_tts_order(),
            google: GoogleTtsConfig::default(),
            gtts: GttsConfig::default(),
            output_dir: default_output_dir(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Twilio credentials; any missing value puts both channels in stub mode
#[derive(Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    #[serde(default)]
    pub account_sid: String,

    #[serde(default)]
    pub auth_token: String,

    #[serde(default)]
    pub from_number: String,

    #[serde(default = "default_twilio_base_url")]
    pub base_url: String,

    #[serde(default = "default_twilio_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_twilio_base_url() -> String {
    "https://api.twilio.com".to_string()
}

const fn default_twilio_timeout_ms() -> u64 {
    15_000
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            base_url: default_twilio_base_url(),
            timeout_ms: default_twilio_timeout_ms(),
        }
    }
}

impl std::fmt::Debug for MessagingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl MessagingConfig {
    pub fn to_twilio_config(&self) -> TwilioConfig {
        TwilioConfig {
            account_sid: self.account_sid.clone(),
            auth_token: self.auth_token.clone(),
            from_number: self.from_number.clone(),
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
        }
    }
}

/// Passage corpus location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_corpus_dir")]
    pub corpus_dir: PathBuf,
}

fn default_corpus_dir() -> PathBuf {
    PathBuf::from("./data/kb")
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            corpus_dir: default_corpus_dir(),
        }
    }
}

/// Log output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryAppConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_log_filter() -> String {
    "info,tower_http=info,sqlx=warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for TelemetryAppConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            log_format: default_log_format(),
        }
    }
}
