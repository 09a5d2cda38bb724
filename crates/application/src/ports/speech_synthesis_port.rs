//! Speech synthesis port - text to audio

use async_trait::async_trait;
use domain::LanguageTag;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Encoded audio from a synthesizer
#[derive(Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl std::fmt::Debug for SynthesizedAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesizedAudio")
            .field("size_bytes", &self.data.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Port for text-to-speech providers
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechSynthesisPort: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        language: &LanguageTag,
    ) -> Result<SynthesizedAudio, ApplicationError>;
}
