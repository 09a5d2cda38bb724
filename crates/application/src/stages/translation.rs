//! Translation of the answer into the caller's language

use std::sync::Arc;

use domain::LanguagePair;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{TranslationOutcome, TranslationPort};
use crate::provider_chain::ProviderChain;

/// What happened to the text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TranslationStatus {
    Translated { provider: &'static str },
    /// Source and target are the same language
    NotNeeded,
    /// No translator could serve the pair; the text is untranslated
    Skipped { reason: String },
}

/// Text to deliver plus how it was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationResult {
    pub text: String,
    pub status: TranslationStatus,
}

impl TranslationResult {
    pub const fn is_skipped(&self) -> bool {
        matches!(self.status, TranslationStatus::Skipped { .. })
    }
}

/// Translates over the translation provider chain
#[derive(Debug)]
pub struct TranslationStage {
    chain: Arc<ProviderChain<dyn TranslationPort>>,
}

impl TranslationStage {
    pub const fn new(chain: Arc<ProviderChain<dyn TranslationPort>>) -> Self {
        Self { chain }
    }

    /// Translate `text` across `pair`
    ///
    /// Never fails: when no translator can serve the pair the original text
    /// comes back flagged as skipped.
    #[instrument(skip(self, text), fields(pair = %pair, text_len = text.len()))]
    pub async fn translate(&self, text: &str, pair: &LanguagePair) -> TranslationResult {
        if pair.is_identity() || text.trim().is_empty() {
            return TranslationResult {
                text: text.to_string(),
                status: TranslationStatus::NotNeeded,
            };
        }

        let result = self
            .chain
            .run(|provider| async move {
                match provider.translate(text, pair).await? {
                    TranslationOutcome::Translated(t) if !t.trim().is_empty() => Ok(t),
                    TranslationOutcome::Translated(_) => Err(ApplicationError::ExternalService(
                        "translator returned empty text".to_string(),
                    )),
                    TranslationOutcome::Unsupported => {
                        let (source, target) = pair.primary();
                        Err(ApplicationError::translation_unsupported(source, target))
                    },
                }
            })
            .await;

        match result {
            Ok(success) => {
                info!(provider = success.provider_id, "Answer translated");
                TranslationResult {
                    text: success.value,
                    status: TranslationStatus::Translated {
                        provider: success.provider_id,
                    },
                }
            },
            Err(exhausted) => {
                warn!(error = %exhausted, "Translation unavailable, delivering untranslated text");
                TranslationResult {
                    text: text.to_string(),
                    status: TranslationStatus::Skipped {
                        reason: exhausted.to_string(),
                    },
                }
            },
        }
    }
}
