//! Builds the provider registry from configuration
//!
//! Provider order comes from the `order` list of each section. Providers
//! that need credentials are left out while their credentials are missing;
//! any other construction failure stops startup.

use std::sync::Arc;
use std::time::Duration;

use ai_core::{
    InferenceEngine, LibreTranslator, LlmTranslator, OllamaInferenceEngine, OpenAiChatEngine,
};
use ai_speech::{GoogleCloudTtsProvider, GttsProvider, OpenAiWhisperProvider, WhisperCppProvider};
use application::error::ApplicationError;
use application::ports::{AnswerPort, SpeechRecognitionPort, SpeechSynthesisPort, TranslationPort};
use application::{ProviderChain, ProviderRegistry};
use tracing::info;

use crate::adapters::{
    InferenceAnswerAdapter, SpeechRecognitionAdapter, SpeechSynthesisAdapter, TranslatorAdapter,
    map_inference_error, map_speech_error,
};
use crate::config::{
    ANSWER_PROVIDERS, ASR_PROVIDERS, AppConfig, TRANSLATION_PROVIDERS, TTS_PROVIDERS,
};

/// Resolve a configured id to its static name
fn provider_id(id: &str, known: &[&'static str]) -> Result<&'static str, ApplicationError> {
    known
        .iter()
        .copied()
        .find(|k| *k == id)
        .ok_or_else(|| ApplicationError::Configuration(format!("unknown provider '{id}'")))
}

fn skipped(capability: &str, id: &str, reason: &str) {
    info!(capability, provider = id, reason, "Provider not enabled");
}

/// Language model engines in `inference.order`, credentials permitting
fn build_engines(
    config: &AppConfig,
) -> Result<Vec<(&'static str, Arc<dyn InferenceEngine>)>, ApplicationError> {
    let mut engines: Vec<(&'static str, Arc<dyn InferenceEngine>)> = Vec::new();
    for id in &config.inference.order {
        match provider_id(id, ANSWER_PROVIDERS)? {
            "openai" if !config.inference.openai.is_configured() => {
                skipped("answer", id, "no API key");
            },
            "openai" => {
                let engine = OpenAiChatEngine::new(config.inference.openai.clone())
                    .map_err(map_inference_error)?;
                engines.push(("openai", Arc::new(engine) as Arc<dyn InferenceEngine>));
            },
            other => {
                let engine = OllamaInferenceEngine::new(config.inference.ollama.clone())
                    .map_err(map_inference_error)?;
                engines.push((other, Arc::new(engine) as Arc<dyn InferenceEngine>));
            },
        }
    }
    Ok(engines)
}

fn build_asr(
    config: &AppConfig,
    timeout: Duration,
) -> Result<ProviderChain<dyn SpeechRecognitionPort>, ApplicationError> {
    let mut chain: ProviderChain<dyn SpeechRecognitionPort> = ProviderChain::new("asr", timeout);
    for id in &config.speech.order {
        match provider_id(id, ASR_PROVIDERS)? {
            "openai" if !config.speech.openai.is_configured() => {
                skipped("asr", id, "no API key");
            },
            "openai" => {
                let provider = OpenAiWhisperProvider::new(config.speech.openai.clone())
                    .map_err(map_speech_error)?;
                chain.push(
                    "openai",
                    Arc::new(SpeechRecognitionAdapter::new(Arc::new(provider))),
                );
            },
            other => {
                let provider = WhisperCppProvider::new(config.speech.whisper_cpp.clone())
                    .map_err(map_speech_error)?;
                chain.push(
                    other,
                    Arc::new(SpeechRecognitionAdapter::new(Arc::new(provider))),
                );
            },
        }
    }
    Ok(chain)
}

fn build_answer(
    engines: &[(&'static str, Arc<dyn InferenceEngine>)],
    timeout: Duration,
) -> ProviderChain<dyn AnswerPort> {
    let mut chain = ProviderChain::new("answer", timeout);
    for (id, engine) in engines {
        chain.push(
            *id,
            Arc::new(InferenceAnswerAdapter::new(Arc::clone(engine))) as Arc<dyn AnswerPort>,
        );
    }
    chain
}

fn build_translation(
    config: &AppConfig,
    engines: &[(&'static str, Arc<dyn InferenceEngine>)],
    timeout: Duration,
) -> Result<ProviderChain<dyn TranslationPort>, ApplicationError> {
    let mut chain = ProviderChain::new("translation", timeout);
    for id in &config.translation.order {
        match provider_id(id, TRANSLATION_PROVIDERS)? {
            "libretranslate" => {
                let translator = LibreTranslator::new(config.translation.libretranslate.clone())
                    .map_err(map_inference_error)?;
                chain.push(
                    "libretranslate",
                    Arc::new(TranslatorAdapter::new(Arc::new(translator))) as Arc<dyn TranslationPort>,
                );
            },
            other => {
                // the highest-priority language model translates
                let Some((_, engine)) = engines.first() else {
                    skipped("translation", id, "no language model available");
                    continue;
                };
                let translator = LlmTranslator::new(Arc::clone(engine), &config.translation.llm);
                chain.push(
                    other,
                    Arc::new(TranslatorAdapter::new(Arc::new(translator))) as Arc<dyn TranslationPort>,
                );
            },
        }
    }
    Ok(chain)
}

fn build_tts(
    config: &AppConfig,
    timeout: Duration,
) -> Result<ProviderChain<dyn SpeechSynthesisPort>, ApplicationError> {
    let mut chain = ProviderChain::new("tts", timeout);
    for id in &config.tts.order {
        match provider_id(id, TTS_PROVIDERS)? {
            "google" if !config.tts.google.is_configured() => {
                skipped("tts", id, "no API key");
            },
            "google" => {
                let provider = GoogleCloudTtsProvider::new(config.tts.google.clone())
                    .map_err(map_speech_error)?;
                chain.push(
                    "google",
                    Arc::new(SpeechSynthesisAdapter::new(Arc::new(provider)))
                        as Arc<dyn SpeechSynthesisPort>,
                );
            },
            other => {
                let provider =
                    GttsProvider::new(config.tts.gtts.clone()).map_err(map_speech_error)?;
                chain.push(
                    other,
                    Arc::new(SpeechSynthesisAdapter::new(Arc::new(provider)))
                        as Arc<dyn SpeechSynthesisPort>,
                );
            },
        }
    }
    Ok(chain)
}

/// Construct every capability chain and the registry owning them
///
/// # Errors
///
/// Returns `ApplicationError::Configuration` for unknown provider ids,
/// invalid provider settings, or when speech recognition, answering or
/// synthesis ends up without any provider.
pub fn build_provider_registry(config: &AppConfig) -> Result<ProviderRegistry, ApplicationError> {
    let timeout = Duration::from_secs(config.pipeline.provider_timeout_secs);
    let engines = build_engines(config)?;

    ProviderRegistry::new(
        build_asr(config, timeout)?,
        build_answer(&engines, timeout),
        build_translation(config, &engines, timeout)?,
        build_tts(config, timeout)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_credentials_use_local_providers() {
        let registry = build_provider_registry(&AppConfig::default()).unwrap();
        let summary = registry.summary();

        assert_eq!(summary.asr, vec!["whisper_cpp"]);
        assert_eq!(summary.answer, vec!["ollama"]);
        assert_eq!(summary.translation, vec!["libretranslate", "llm"]);
        assert_eq!(summary.tts, vec!["gtts"]);
    }

    #[test]
    fn credentials_enable_cloud_providers_in_order() {
        let mut config = AppConfig::default();
        config.speech.openai.api_key = Some("sk".to_string());
        config.inference.openai.api_key = Some("sk".to_string());
        config.tts.google.api_key = Some("g".to_string());

        let summary = build_provider_registry(&config).unwrap().summary();

        assert_eq!(summary.asr, vec!["whisper_cpp", "openai"]);
        assert_eq!(summary.answer, vec!["openai", "ollama"]);
        assert_eq!(summary.tts, vec!["google", "gtts"]);
    }

    #[test]
    fn missing_mandatory_capability_fails() {
        let mut config = AppConfig::default();
        config.speech.order = vec!["openai".to_string()];
        let err = build_provider_registry(&config).unwrap_err();
        assert!(err.to_string().contains("no asr provider"));
    }

    #[test]
    fn empty_translation_is_allowed() {
        let mut config = AppConfig::default();
        config.translation.order.clear();
        let registry = build_provider_registry(&config).unwrap();
        assert!(registry.summary().translation.is_empty());
    }

    #[test]
    fn llm_translation_needs_an_engine() {
        let mut config = AppConfig::default();
        config.translation.order = vec!["llm".to_string()];
        config.inference.order = vec!["openai".to_string()];
        // no OpenAI key: no engine at all, so answering fails first
        assert!(build_provider_registry(&config).is_err());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut config = AppConfig::default();
        config.tts.order = vec!["polly".to_string()];
        assert!(matches!(
            build_provider_registry(&config),
            Err(ApplicationError::Configuration(_))
        ));
    }
}
