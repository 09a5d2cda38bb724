//! Provider registry - every capability chain with an explicit lifecycle
//!
//! Built once at startup and injected into the stages. Translators cache
//! per-pair resources, which `shutdown` releases.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::ApplicationError;
use crate::ports::{AnswerPort, SpeechRecognitionPort, SpeechSynthesisPort, TranslationPort};
use crate::provider_chain::ProviderChain;

/// Configured provider ids per capability, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSummary {
    pub asr: Vec<&'static str>,
    pub answer: Vec<&'static str>,
    pub translation: Vec<&'static str>,
    pub tts: Vec<&'static str>,
}

/// Owns the provider chain of each capability
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    asr: Arc<ProviderChain<dyn SpeechRecognitionPort>>,
    answer: Arc<ProviderChain<dyn AnswerPort>>,
    translation: Arc<ProviderChain<dyn TranslationPort>>,
    tts: Arc<ProviderChain<dyn SpeechSynthesisPort>>,
}

impl ProviderRegistry {
    /// Assemble the registry
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` when speech recognition,
    /// answering or synthesis has no provider. Translation may be empty.
    pub fn new(
        asr: ProviderChain<dyn SpeechRecognitionPort>,
        answer: ProviderChain<dyn AnswerPort>,
        translation: ProviderChain<dyn TranslationPort>,
        tts: ProviderChain<dyn SpeechSynthesisPort>,
    ) -> Result<Self, ApplicationError> {
        for (capability, empty) in [
            (asr.capability(), asr.is_empty()),
            (answer.capability(), answer.is_empty()),
            (tts.capability(), tts.is_empty()),
        ] {
            if empty {
                return Err(ApplicationError::Configuration(format!(
                    "no {capability} provider configured"
                )));
            }
        }

        let registry = Self {
            asr: Arc::new(asr),
            answer: Arc::new(answer),
            translation: Arc::new(translation),
            tts: Arc::new(tts),
        };
        info!(providers = ?registry.summary(), "Provider registry ready");
        Ok(registry)
    }

    pub fn asr(&self) -> Arc<ProviderChain<dyn SpeechRecognitionPort>> {
        Arc::clone(&self.asr)
    }

    pub fn answer(&self) -> Arc<ProviderChain<dyn AnswerPort>> {
        Arc::clone(&self.answer)
    }

    pub fn translation(&self) -> Arc<ProviderChain<dyn TranslationPort>> {
        Arc::clone(&self.translation)
    }

    pub fn tts(&self) -> Arc<ProviderChain<dyn SpeechSynthesisPort>> {
        Arc::clone(&self.tts)
    }

    pub fn summary(&self) -> ProviderSummary {
        ProviderSummary {
            asr: self.asr.provider_ids(),
            answer: self.answer.provider_ids(),
            translation: self.translation.provider_ids(),
            tts: self.tts.provider_ids(),
        }
    }

    /// Release cached resources held by providers
    pub fn shutdown(&self) {
        for translator in self.translation.providers() {
            translator.shutdown();
        }
        info!("Provider registry shut down");
    }
}
