//! Speech synthesis of the delivered text

use std::sync::Arc;

use domain::{CallerId, LanguageTag};
use tracing::{info, instrument, warn};

use crate::ports::{ArtifactStore, PlayableRef, SpeechSynthesisPort};
use crate::provider_chain::ProviderChain;

/// Artifact name for a caller; the same caller always maps to the same file
pub fn tts_file_name(caller: &CallerId) -> String {
    format!("tts_{}.mp3", caller.artifact_stem())
}

/// Synthesizes text and stores the audio where it can be played from
pub struct TtsStage {
    chain: Arc<ProviderChain<dyn SpeechSynthesisPort>>,
    store: Arc<dyn ArtifactStore>,
}

impl std::fmt::Debug for TtsStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtsStage")
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl TtsStage {
    pub fn new(
        chain: Arc<ProviderChain<dyn SpeechSynthesisPort>>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self { chain, store }
    }

    /// Synthesize `text` for `caller`, overwriting any earlier artifact
    ///
    /// Failures are logged and yield `None`; the call carries on without a
    /// playable answer.
    #[instrument(skip(self, text), fields(caller = %caller, language = %language, text_len = text.len()))]
    pub async fn synthesize(
        &self,
        caller: &CallerId,
        text: &str,
        language: &LanguageTag,
    ) -> Option<PlayableRef> {
        if text.trim().is_empty() {
            return None;
        }

        let audio = match self
            .chain
            .run(|provider| async move { provider.synthesize(text, language).await })
            .await
        {
            Ok(success) => {
                info!(provider = success.provider_id, size_bytes = success.value.data.len(), "Speech synthesized");
                success.value
            },
            Err(exhausted) => {
                warn!(error = %exhausted, "Speech synthesis unavailable");
                return None;
            },
        };

        let name = tts_file_name(caller);
        match self.store.save(&name, &audio.data).await {
            Ok(playable) => Some(playable),
            Err(e) => {
                warn!(error = %e, file = %name, "Failed to store synthesized audio");
                None
            },
        }
    }
}
