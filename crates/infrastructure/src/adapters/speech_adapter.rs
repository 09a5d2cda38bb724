//! Speech adapters - ai_speech providers behind the recognition, synthesis
//! and normalization ports

use std::sync::Arc;

use ai_speech::{
    AudioConverter, AudioData, AudioFormat, SpeechError, SpeechToText, TextToSpeech,
    TranscribeOptions,
};
use application::error::ApplicationError;
use application::ports::{
    AudioClip, AudioNormalizer, RecognitionOptions, SpeechRecognitionPort, SpeechSynthesisPort,
    SynthesizedAudio,
};
use async_trait::async_trait;
use domain::{Confidence, LanguageTag, Transcript};
use tracing::{debug, instrument};

/// Map speech error to application error
pub fn map_speech_error(err: SpeechError) -> ApplicationError {
    match err {
        SpeechError::Configuration(e) => ApplicationError::Configuration(e),
        SpeechError::ConnectionFailed(e) | SpeechError::RequestFailed(e) => {
            ApplicationError::ExternalService(e)
        },
        SpeechError::RateLimited => ApplicationError::RateLimited,
        SpeechError::Timeout(ms) => {
            ApplicationError::ExternalService(format!("Speech service timeout after {ms}ms"))
        },
        SpeechError::InvalidAudio(e) => {
            ApplicationError::AudioAcquisition(format!("Invalid audio: {e}"))
        },
        SpeechError::AudioTooLarge {
            size_bytes,
            max_bytes,
        } => ApplicationError::AudioAcquisition(format!(
            "Audio too large: {size_bytes} bytes exceeds {max_bytes} bytes"
        )),
        SpeechError::AudioProcessing(e) => {
            ApplicationError::AudioAcquisition(format!("Audio processing failed: {e}"))
        },
        other => ApplicationError::Speech(other.to_string()),
    }
}

fn clip_to_audio(clip: &AudioClip) -> AudioData {
    let format = AudioFormat::from_mime_type(&clip.mime_type).unwrap_or(AudioFormat::Wav);
    AudioData::new(clip.data.clone(), format)
}

/// Recognizer backed by one ai_speech STT provider
pub struct SpeechRecognitionAdapter {
    provider: Arc<dyn SpeechToText>,
}

impl std::fmt::Debug for SpeechRecognitionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechRecognitionAdapter")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model_name())
            .finish()
    }
}

impl SpeechRecognitionAdapter {
    pub fn new(provider: Arc<dyn SpeechToText>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl SpeechRecognitionPort for SpeechRecognitionAdapter {
    #[instrument(
        skip(self, audio, options),
        fields(provider = self.provider.provider_name(), size_bytes = audio.len())
    )]
    async fn recognize(
        &self,
        audio: &AudioClip,
        options: &RecognitionOptions,
    ) -> Result<Transcript, ApplicationError> {
        // providers can only translate into English; other targets get a
        // verbatim transcript
        let request = TranscribeOptions {
            translate_to_english: options.output_language.primary() == "en",
            language_hint: options
                .language_hint
                .as_ref()
                .map(|tag| tag.primary().to_string()),
        };

        let transcription = self
            .provider
            .transcribe(&clip_to_audio(audio), &request)
            .await
            .map_err(map_speech_error)?;

        debug!(
            text_len = transcription.text.len(),
            language = ?transcription.language,
            "Recognition completed"
        );

        let mut transcript = Transcript::new(
            transcription.text,
            Confidence::from_optional(transcription.confidence),
            self.provider.provider_name(),
        );
        if let Some(detected) = transcription
            .language
            .as_deref()
            .and_then(|l| LanguageTag::new(l).ok())
        {
            transcript = transcript.with_detected_language(detected);
        }
        Ok(transcript)
    }
}

/// Synthesizer backed by one ai_speech TTS provider
pub struct SpeechSynthesisAdapter {
    provider: Arc<dyn TextToSpeech>,
}

impl std::fmt::Debug for SpeechSynthesisAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechSynthesisAdapter")
            .field("provider", &self.provider.provider_name())
            .finish()
    }
}

impl SpeechSynthesisAdapter {
    pub fn new(provider: Arc<dyn TextToSpeech>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl SpeechSynthesisPort for SpeechSynthesisAdapter {
    #[instrument(
        skip(self, text),
        fields(provider = self.provider.provider_name(), text_len = text.len(), language = %language)
    )]
    async fn synthesize(
        &self,
        text: &str,
        language: &LanguageTag,
    ) -> Result<SynthesizedAudio, ApplicationError> {
        let audio = self
            .provider
            .synthesize(text, language.as_str())
            .await
            .map_err(map_speech_error)?;

        Ok(SynthesizedAudio {
            mime_type: audio.mime_type().to_string(),
            data: audio.into_bytes().to_vec(),
        })
    }
}

/// Brings recordings to mono 16 kHz WAV through FFmpeg
#[derive(Debug, Clone, Default)]
pub struct FfmpegNormalizer {
    converter: AudioConverter,
}

impl FfmpegNormalizer {
    pub const fn new() -> Self {
        Self {
            converter: AudioConverter::new(),
        }
    }

    /// Use a specific FFmpeg binary
    pub fn with_ffmpeg_path(path: impl Into<String>) -> Self {
        Self {
            converter: AudioConverter::with_ffmpeg_path(path),
        }
    }
}

#[async_trait]
impl AudioNormalizer for FfmpegNormalizer {
    #[instrument(skip(self, clip), fields(size_bytes = clip.len(), mime_type = %clip.mime_type))]
    async fn normalize(&self, clip: AudioClip) -> Result<AudioClip, ApplicationError> {
        let audio = clip_to_audio(&clip);
        if audio.is_canonical() {
            return Ok(clip);
        }

        let canonical = self
            .converter
            .to_canonical(&audio)
            .await
            .map_err(map_speech_error)?;
        Ok(AudioClip::new(
            canonical.data().to_vec(),
            canonical.mime_type(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use ai_speech::Transcription;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct FakeStt {
        seen: Mutex<Option<TranscribeOptions>>,
        result: Option<Transcription>,
    }

    #[async_trait]
    impl SpeechToText for FakeStt {
        async fn transcribe(
            &self,
            audio: &AudioData,
            options: &TranscribeOptions,
        ) -> Result<Transcription, SpeechError> {
            assert_eq!(audio.format(), AudioFormat::Mp3);
            *self.seen.lock() = Some(options.clone());
            self.result.clone().ok_or(SpeechError::RateLimited)
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn provider_name(&self) -> &'static str {
            "fake_stt"
        }

        fn model_name(&self) -> &str {
            "fake-1"
        }
    }

    struct FakeTts;

    #[async_trait]
    impl TextToSpeech for FakeTts {
        async fn synthesize(&self, text: &str, language: &str) -> Result<AudioData, SpeechError> {
            if text.is_empty() {
                return Err(SpeechError::SynthesisFailed("empty".to_string()));
            }
            Ok(AudioData::new(
                format!("{language}:{text}").into_bytes(),
                AudioFormat::Mp3,
            ))
        }

        fn provider_name(&self) -> &'static str {
            "fake_tts"
        }
    }

    fn mp3_clip() -> AudioClip {
        AudioClip::new(vec![0xFF, 0xFB, 0x90], "audio/mpeg")
    }

    fn options() -> RecognitionOptions {
        RecognitionOptions::translate_to(LanguageTag::english(), Some(LanguageTag::malayalam()))
    }

    #[tokio::test]
    async fn recognition_translates_to_english_with_hint() {
        let stt = Arc::new(FakeStt {
            result: Some(
                Transcription::new("  what is the weather for paddy today ")
                    .with_language("ml")
                    .with_confidence(0.7),
            ),
            ..Default::default()
        });
        let adapter = SpeechRecognitionAdapter::new(Arc::clone(&stt) as Arc<dyn SpeechToText>);

        let transcript = adapter.recognize(&mp3_clip(), &options()).await.unwrap();

        assert_eq!(transcript.text, "what is the weather for paddy today");
        assert_eq!(transcript.provider, "fake_stt");
        assert!((transcript.confidence.value() - 0.7).abs() < f64::EPSILON);
        let seen = stt.seen.lock().clone().unwrap();
        assert!(seen.translate_to_english);
        assert_eq!(seen.language_hint.as_deref(), Some("ml"));
    }

    #[tokio::test]
    async fn missing_confidence_is_zero() {
        let stt = FakeStt {
            result: Some(Transcription::new("")),
            ..Default::default()
        };
        let adapter = SpeechRecognitionAdapter::new(Arc::new(stt));

        let transcript = adapter.recognize(&mp3_clip(), &options()).await.unwrap();
        assert!(transcript.is_empty());
        assert_eq!(transcript.confidence, Confidence::UNKNOWN);
    }

    #[tokio::test]
    async fn provider_errors_are_mapped() {
        let adapter = SpeechRecognitionAdapter::new(Arc::new(FakeStt::default()));
        let err = adapter.recognize(&mp3_clip(), &options()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::RateLimited));
    }

    #[tokio::test]
    async fn synthesis_passes_language_and_mime() {
        let adapter = SpeechSynthesisAdapter::new(Arc::new(FakeTts));
        let audio = adapter
            .synthesize("നമസ്കാരം", &LanguageTag::malayalam())
            .await
            .unwrap();
        assert_eq!(audio.mime_type, "audio/mpeg");
        assert_eq!(audio.data, "ml:നമസ്കാരം".as_bytes());

        let err = adapter
            .synthesize("", &LanguageTag::malayalam())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Speech(_)));
    }

    fn canonical_wav() -> Vec<u8> {
        let samples: u32 = 160;
        let data_len = samples * 2;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&16_000u32.to_le_bytes());
        out.extend_from_slice(&32_000u32.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        out.resize(out.len() + data_len as usize, 0);
        out
    }

    #[tokio::test]
    async fn canonical_wav_passes_through_without_ffmpeg() {
        let normalizer = FfmpegNormalizer::with_ffmpeg_path("/nonexistent/ffmpeg");
        let clip = AudioClip::new(canonical_wav(), "audio/wav");
        let out = normalizer.normalize(clip.clone()).await.unwrap();
        assert_eq!(out, clip);
    }

    #[tokio::test]
    async fn missing_ffmpeg_is_an_acquisition_error() {
        let normalizer = FfmpegNormalizer::with_ffmpeg_path("/nonexistent/ffmpeg");
        let err = normalizer.normalize(mp3_clip()).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::AudioAcquisition(_) | ApplicationError::Speech(_)
        ));
    }

    #[test]
    fn error_mapping() {
        assert!(matches!(
            map_speech_error(SpeechError::Timeout(100)),
            ApplicationError::ExternalService(_)
        ));
        assert!(matches!(
            map_speech_error(SpeechError::Configuration("x".into())),
            ApplicationError::Configuration(_)
        ));
        assert!(matches!(
            map_speech_error(SpeechError::TranscriptionFailed("x".into())),
            ApplicationError::Speech(_)
        ));
    }
}
