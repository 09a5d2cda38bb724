//! Speech recognition port - audio to working-language text

use async_trait::async_trait;
use domain::{LanguageTag, Transcript};
#[cfg(test)]
use mockall::automock;

use super::recording_port::AudioClip;
use crate::error::ApplicationError;

/// How a recording should be recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// Language the transcript must be in
    pub output_language: LanguageTag,
    /// Language the caller is expected to speak, if known
    pub language_hint: Option<LanguageTag>,
}

impl RecognitionOptions {
    /// Recognize and translate into `output_language`
    pub fn translate_to(output_language: LanguageTag, language_hint: Option<LanguageTag>) -> Self {
        Self {
            output_language,
            language_hint,
        }
    }
}

/// Port for speech-to-text providers
///
/// An empty transcript is a successful result meaning the recording held no
/// intelligible speech.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechRecognitionPort: Send + Sync {
    async fn recognize(
        &self,
        audio: &AudioClip,
        options: &RecognitionOptions,
    ) -> Result<Transcript, ApplicationError>;
}
