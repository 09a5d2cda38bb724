//! Translation through a language model prompt

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::registry::PairRegistry;
use crate::config::LlmTranslatorConfig;
use crate::error::InferenceError;
use crate::ports::{InferenceEngine, InferenceRequest, Translator};

/// English name for an ISO 639-1 code, used inside prompts
pub fn language_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "en" => "English",
        "ml" => "Malayalam",
        "hi" => "Hindi",
        "ta" => "Tamil",
        "kn" => "Kannada",
        "te" => "Telugu",
        "mr" => "Marathi",
        "bn" => "Bengali",
        "gu" => "Gujarati",
        "pa" => "Punjabi",
        _ => return None,
    };
    Some(name)
}

/// Translator that asks an inference engine to translate
pub struct LlmTranslator {
    engine: Arc<dyn InferenceEngine>,
    languages: HashSet<String>,
    prompts: PairRegistry<String>,
}

impl LlmTranslator {
    pub fn new(engine: Arc<dyn InferenceEngine>, config: &LlmTranslatorConfig) -> Self {
        Self {
            engine,
            languages: config.languages.iter().cloned().collect(),
            prompts: PairRegistry::new(),
        }
    }

    fn system_prompt(&self, source: &str, target: &str) -> Option<String> {
        if !self.languages.contains(source) || !self.languages.contains(target) {
            return None;
        }
        let from = language_name(source)?;
        let to = language_name(target)?;
        Some(format!(
            "Translate the user's message from {from} to {to}. \
             Reply with the translation only, without quotes or explanations."
        ))
    }
}

impl std::fmt::Debug for LlmTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmTranslator")
            .field("engine", &self.engine.engine_name())
            .field("languages", &self.languages)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    #[instrument(skip(self, text), fields(text_len = text.len(), engine = self.engine.engine_name()))]
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, InferenceError> {
        let prompt = self
            .prompts
            .get_or_load(source, target, || async {
                Ok(self.system_prompt(source, target))
            })
            .await?
            .ok_or_else(|| InferenceError::unsupported_pair(source, target))?;

        let request = InferenceRequest::with_system(prompt.as_str(), text).temperature(0.0);
        let response = self.engine.generate(request).await?;
        let translated = response.content.trim();

        if translated.is_empty() {
            return Err(InferenceError::InvalidResponse(
                "Model returned an empty translation".to_string(),
            ));
        }

        debug!(model = %response.model, "LLM translation completed");
        Ok(translated.to_string())
    }

    fn translator_name(&self) -> &'static str {
        "llm"
    }

    fn shutdown(&self) {
        self.prompts.clear();
    }
}
