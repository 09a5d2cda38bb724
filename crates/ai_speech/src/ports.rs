//! Speech provider traits
//!
//! Every provider implements one of these traits; the application layer
//! orders them into fallback chains.

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::types::{AudioData, TranscribeOptions, Transcription};

/// Speech-to-Text (STT) provider
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Recognize speech in `audio`
    ///
    /// # Arguments
    ///
    /// * `audio` - Audio to recognize, canonical WAV preferred
    /// * `options` - Translation mode and language hint
    ///
    /// # Returns
    ///
    /// The recognized text. An empty text means no speech was found and is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unreachable or rejects the audio.
    async fn transcribe(
        &self,
        audio: &AudioData,
        options: &TranscribeOptions,
    ) -> Result<Transcription, SpeechError>;

    /// Check if the provider can be used right now
    async fn is_available(&self) -> bool;

    /// Stable provider identifier used in logs and records
    fn provider_name(&self) -> &'static str;

    /// Model used for recognition
    fn model_name(&self) -> &str;
}

/// Text-to-Speech (TTS) provider
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize speech for `text` in `language` (BCP-47, e.g. `ml` or `ml-IN`)
    ///
    /// # Errors
    ///
    /// Returns an error if synthesis fails or produces no audio.
    async fn synthesize(&self, text: &str, language: &str) -> Result<AudioData, SpeechError>;

    /// Stable provider identifier used in logs and records
    fn provider_name(&self) -> &'static str;
}
