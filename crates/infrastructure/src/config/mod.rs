//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `database`: SQLite database settings
//! - `pipeline`: languages, retrieval depth, worker pool
//! - `providers`: speech, language models, translation, synthesis,
//!   messaging, knowledge corpus and log output
//!
//! Sources in increasing precedence: built-in defaults, an optional
//! `config.toml`, `KRISHI__`-style environment variables, then the legacy
//! deployment variables (`TW_SID`, `OPENAI_API_KEY`, ...).

mod database;
mod pipeline;
mod providers;
mod server;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use database::DatabaseConfig;
pub use pipeline::PipelineConfig;
pub use providers::{
    ANSWER_PROVIDERS, ASR_PROVIDERS, InferenceAppConfig, KnowledgeConfig, MessagingConfig,
    SpeechAppConfig, TRANSLATION_PROVIDERS, TTS_PROVIDERS, TelemetryAppConfig,
    TranslationAppConfig, TtsAppConfig,
};
pub use server::ServerConfig;

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Environment variable prefix, e.g. `KRISHI_SERVER__PORT`
pub const ENV_PREFIX: &str = "KRISHI";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub speech: SpeechAppConfig,

    #[serde(default)]
    pub inference: InferenceAppConfig,

    #[serde(default)]
    pub translation: TranslationAppConfig,

    #[serde(default)]
    pub tts: TtsAppConfig,

    #[serde(default)]
    pub messaging: MessagingConfig,

    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    #[serde(default)]
    pub telemetry: TelemetryAppConfig,
}

impl AppConfig {
    /// Load configuration from the optional `config.toml` and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            // e.g. KRISHI_SERVER__PORT=9000, KRISHI_PIPELINE__WORKERS=8
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_legacy_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Honour the variable names of the original deployment
    ///
    /// Values found through `lookup` override whatever the other sources set.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(sid) = get("TW_SID") {
            self.messaging.account_sid = sid;
        }
        if let Some(token) = get("TW_TOKEN") {
            self.messaging.auth_token = token;
        }
        if let Some(from) = get("TW_FROM") {
            self.messaging.from_number = from;
        }
        if let Some(host) = get("TTS_HOST") {
            self.tts.public_base_url = format!("{}/static/tts", host.trim_end_matches('/'));
        }
        if let Some(url) = get("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.speech.openai.api_key = Some(key.clone());
            self.inference.openai.api_key = Some(key);
        }
        if let Some(key) = get("GOOGLE_API_KEY") {
            self.tts.google.api_key = Some(key);
        }
        if let Some(url) = get("OLLAMA_URL") {
            self.inference.ollama.base_url = url;
        }
        if let Some(flag) = get("USE_GOOGLE_TTS") {
            let enabled = matches!(flag.trim().to_lowercase().as_str(), "1" | "true" | "yes");
            self.tts.order.retain(|id| id != "google");
            if enabled {
                self.tts.order.insert(0, "google".to_string());
            }
        }
        debug!("Legacy environment applied");
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must not be 0".to_string());
        }
        if self.pipeline.retrieval_top_k == 0 {
            return Err("pipeline.retrieval_top_k must be at least 1".to_string());
        }
        if self.pipeline.workers == 0 {
            return Err("pipeline.workers must be at least 1".to_string());
        }
        if self.pipeline.queue_capacity == 0 {
            return Err("pipeline.queue_capacity must be at least 1".to_string());
        }
        if self.pipeline.provider_timeout_secs == 0 {
            return Err("pipeline.provider_timeout_secs must be greater than 0".to_string());
        }
        domain::LanguageTag::new(&self.pipeline.working_language)
            .map_err(|e| format!("pipeline.working_language: {e}"))?;
        domain::LanguageTag::new(&self.pipeline.default_caller_language)
            .map_err(|e| format!("pipeline.default_caller_language: {e}"))?;

        validate_order("speech.order", &self.speech.order, ASR_PROVIDERS)?;
        validate_order("inference.order", &self.inference.order, ANSWER_PROVIDERS)?;
        validate_order(
            "translation.order",
            &self.translation.order,
            TRANSLATION_PROVIDERS,
        )?;
        validate_order("tts.order", &self.tts.order, TTS_PROVIDERS)?;

        if !matches!(self.telemetry.log_format.as_str(), "text" | "json") {
            return Err(format!(
                "telemetry.log_format must be 'text' or 'json', got '{}'",
                self.telemetry.log_format
            ));
        }
        Ok(())
    }
}

fn validate_order(field: &str, order: &[String], known: &[&str]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for id in order {
        if !known.contains(&id.as_str()) {
            return Err(format!(
                "{field}: unknown provider '{id}' (expected one of {})",
                known.join(", ")
            ));
        }
        if !seen.insert(id.as_str()) {
            return Err(format!("{field}: provider '{id}' listed twice"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.pipeline.working_language, "en");
        assert_eq!(config.pipeline.default_caller_language, "ml");
        assert_eq!(config.pipeline.retrieval_top_k, 3);
        assert_eq!(config.pipeline.workers, 4);
        assert_eq!(config.pipeline.queue_capacity, 256);
        assert!(config.speech.local_recordings_dir.is_none());
        assert_eq!(config.speech.order, vec!["whisper_cpp", "openai"]);
        assert_eq!(config.inference.order, vec!["openai", "ollama"]);
        assert_eq!(config.translation.order, vec!["libretranslate", "llm"]);
        assert_eq!(config.tts.output_dir.to_str(), Some("/tmp/tts"));
        assert_eq!(config.tts.public_base_url, "http://localhost:8000/static/tts");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 9000

            [pipeline]
            workers = 2

            [inference]
            order = ["ollama"]

            [inference.ollama]
            default_model = "llama3"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.pipeline.workers, 2);
        assert_eq!(config.pipeline.retrieval_top_k, 3);
        assert_eq!(config.inference.order, vec!["ollama"]);
        assert_eq!(config.inference.ollama.default_model, "llama3");
        assert_eq!(config.inference.ollama.timeout_ms, 30_000);
    }

    #[test]
    fn legacy_twilio_and_keys() {
        let mut config = AppConfig::default();
        config.apply_legacy_env(lookup(&[
            ("TW_SID", "AC123"),
            ("TW_TOKEN", "secret"),
            ("TW_FROM", "+15550001"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OLLAMA_URL", "http://gpu:11434"),
            ("DATABASE_URL", "sqlite:///var/lib/krishi.db"),
        ]));

        assert!(config.messaging.to_twilio_config().is_complete());
        assert_eq!(config.speech.openai.api_key.as_deref(), Some("sk-test"));
        assert!(config.inference.openai.is_configured());
        assert_eq!(config.inference.ollama.base_url, "http://gpu:11434");
        assert_eq!(config.database.url, "sqlite:///var/lib/krishi.db");
    }

    #[test]
    fn legacy_tts_host_builds_public_url() {
        let mut config = AppConfig::default();
        config.apply_legacy_env(lookup(&[("TTS_HOST", "https://krishi.example/")]));
        assert_eq!(config.tts.public_base_url, "https://krishi.example/static/tts");
    }

    #[test]
    fn use_google_tts_controls_order() {
        let mut config = AppConfig::default();
        config.apply_legacy_env(lookup(&[("USE_GOOGLE_TTS", "0")]));
        assert_eq!(config.tts.order, vec!["gtts"]);

        config.apply_legacy_env(lookup(&[("USE_GOOGLE_TTS", "true"), ("GOOGLE_API_KEY", "g")]));
        assert_eq!(config.tts.order, vec!["google", "gtts"]);
        assert_eq!(config.tts.google.api_key.as_deref(), Some("g"));
    }

    #[test]
    fn blank_legacy_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_legacy_env(lookup(&[("TW_SID", "  "), ("OLLAMA_URL", "")]));
        assert!(config.messaging.account_sid.is_empty());
        assert_eq!(config.inference.ollama.base_url, "http://localhost:11434");
    }

    #[test]
    fn validate_rejects_zero_values() {
        let mut config = AppConfig::default();
        config.pipeline.retrieval_top_k = 0;
        assert!(config.validate().unwrap_err().contains("retrieval_top_k"));

        let mut config = AppConfig::default();
        config.pipeline.workers = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pipeline.provider_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_and_unknown_providers() {
        let mut config = AppConfig::default();
        config.speech.order = vec!["openai".to_string(), "openai".to_string()];
        assert!(config.validate().unwrap_err().contains("listed twice"));

        let mut config = AppConfig::default();
        config.tts.order = vec!["polly".to_string()];
        assert!(config.validate().unwrap_err().contains("unknown provider 'polly'"));
    }

    #[test]
    fn validate_rejects_bad_log_format() {
        let mut config = AppConfig::default();
        config.telemetry.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_twilio_token() {
        let mut config = AppConfig::default();
        config.messaging.auth_token = "very-secret".to_string();
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
