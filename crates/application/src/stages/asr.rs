//! Speech recognition over the ASR provider chain

use std::sync::Arc;

use domain::{LanguageTag, Transcript};
use tracing::{info, instrument};

use crate::ports::{AudioClip, RecognitionOptions, SpeechRecognitionPort};
use crate::provider_chain::{ProviderChain, ProviderChainExhausted};

/// Recognizes canonical audio straight into the working language
#[derive(Debug)]
pub struct AsrStage {
    chain: Arc<ProviderChain<dyn SpeechRecognitionPort>>,
    working_language: LanguageTag,
}

impl AsrStage {
    pub const fn new(
        chain: Arc<ProviderChain<dyn SpeechRecognitionPort>>,
        working_language: LanguageTag,
    ) -> Self {
        Self {
            chain,
            working_language,
        }
    }

    /// Recognize `audio`, translating into the working language
    ///
    /// An empty transcript is returned as `Ok`.
    ///
    /// # Errors
    ///
    /// Returns the aggregated failure when every recognizer fails.
    #[instrument(skip(self, audio), fields(audio_size = audio.len()))]
    pub async fn recognize(
        &self,
        audio: &AudioClip,
        caller_language: Option<&LanguageTag>,
    ) -> Result<Transcript, ProviderChainExhausted> {
        let options = RecognitionOptions::translate_to(
            self.working_language.clone(),
            caller_language.cloned(),
        );
        let options = &options;

        let success = self
            .chain
            .run(|provider| async move { provider.recognize(audio, options).await })
            .await?;

        let mut transcript = success.value;
        if transcript.provider.is_empty() {
            transcript.provider = success.provider_id.to_string();
        }

        info!(
            provider = success.provider_id,
            text_len = transcript.text.len(),
            confidence = transcript.confidence.value(),
            "Speech recognized"
        );
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use domain::Confidence;

    use super::*;
    use crate::error::ApplicationError;
    use crate::ports::MockSpeechRecognitionPort;

    fn stage(providers: Vec<(&'static str, MockSpeechRecognitionPort)>) -> AsrStage {
        let mut chain = ProviderChain::new("asr", Duration::from_secs(1));
        for (id, p) in providers {
            chain.push(id, Arc::new(p) as Arc<dyn SpeechRecognitionPort>);
        }
        AsrStage::new(Arc::new(chain), LanguageTag::english())
    }

    #[tokio::test]
    async fn requests_translation_into_working_language() {
        let mut whisper = MockSpeechRecognitionPort::new();
        whisper
            .expect_recognize()
            .withf(|_, options| {
                options.output_language == LanguageTag::english()
                    && options.language_hint == Some(LanguageTag::malayalam())
            })
            .returning(|_, _| Ok(Transcript::new("paddy", Confidence::new(0.7), "")));

        let transcript = stage(vec![("whisper_cpp", whisper)])
            .recognize(
                &AudioClip::new(vec![0; 8], "audio/wav"),
                Some(&LanguageTag::malayalam()),
            )
            .await
            .unwrap();

        assert_eq!(transcript.text, "paddy");
        assert_eq!(transcript.provider, "whisper_cpp");
    }

    #[tokio::test]
    async fn falls_back_to_next_recognizer() {
        let mut local = MockSpeechRecognitionPort::new();
        local
            .expect_recognize()
            .returning(|_, _| Err(ApplicationError::Speech("model missing".to_string())));
        let mut remote = MockSpeechRecognitionPort::new();
        remote
            .expect_recognize()
            .returning(|_, _| Ok(Transcript::new("", Confidence::UNKNOWN, "openai")));

        let transcript = stage(vec![("whisper_cpp", local), ("openai", remote)])
            .recognize(&AudioClip::new(vec![0; 8], "audio/wav"), None)
            .await
            .unwrap();

        assert!(transcript.is_empty());
        assert_eq!(transcript.provider, "openai");
    }

    #[tokio::test]
    async fn exhaustion_is_returned() {
        let mut local = MockSpeechRecognitionPort::new();
        local
            .expect_recognize()
            .returning(|_, _| Err(ApplicationError::Speech("down".to_string())));

        let err = stage(vec![("whisper_cpp", local)])
            .recognize(&AudioClip::new(vec![0; 8], "audio/wav"), None)
            .await
            .unwrap_err();
        assert_eq!(err.failures.len(), 1);
    }
}
