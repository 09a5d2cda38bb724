//! Translation adapter - ai_core translators behind the translation port

use std::sync::Arc;

use ai_core::{InferenceError, Translator};
use application::error::ApplicationError;
use application::ports::{TranslationOutcome, TranslationPort};
use async_trait::async_trait;
use domain::LanguagePair;
use tracing::{debug, instrument};

use super::answer_adapter::map_inference_error;

/// Wraps one translator; unsupported pairs become `TranslationOutcome::Unsupported`
pub struct TranslatorAdapter {
    translator: Arc<dyn Translator>,
}

impl std::fmt::Debug for TranslatorAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorAdapter")
            .field("translator", &self.translator.translator_name())
            .finish()
    }
}

impl TranslatorAdapter {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }
}

#[async_trait]
impl TranslationPort for TranslatorAdapter {
    #[instrument(
        skip(self, text),
        fields(translator = self.translator.translator_name(), pair = %pair, text_len = text.len())
    )]
    async fn translate(
        &self,
        text: &str,
        pair: &LanguagePair,
    ) -> Result<TranslationOutcome, ApplicationError> {
        let (source, target) = pair.primary();
        match self.translator.translate(text, source, target).await {
            Ok(translated) => Ok(TranslationOutcome::Translated(translated)),
            Err(InferenceError::UnsupportedPair { .. }) => {
                debug!("Pair not supported by translator");
                Ok(TranslationOutcome::Unsupported)
            },
            Err(e) => Err(map_inference_error(e)),
        }
    }

    fn shutdown(&self) {
        self.translator.shutdown();
    }
}
