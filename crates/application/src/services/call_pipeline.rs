//! Call pipeline service - turns one recorded call into a delivered answer
//!
//! Runs the stages in order against a [`CallSession`]:
//! audio acquisition, recognition, answering, translation, synthesis and
//! notification, then persists exactly one query record. Any stage failure
//! swaps the answer for a localized fallback message, which is still
//! synthesized, delivered and persisted before the session ends in `Failed`.

use std::fmt;
use std::sync::Arc;

use domain::{
    Answer, CallSession, CallStatus, CallerId, Confidence, LanguagePair, LanguageTag,
    NewQueryRecord, QueryId, QueryRecord,
};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::fallback_messages::{FallbackKind, answer_sms_body, fallback_message};
use crate::ports::{
    ArtifactStore, AudioNormalizer, KnowledgeSource, PlayableRef, QueryRecordStore,
    RecordingFetcher, TextMessagingPort, VoiceMessagingPort,
};
use crate::registry::ProviderRegistry;
use crate::stages::{
    AnsweringStage, AsrStage, AudioAcquisitionStage, NotificationReport, NotificationStage,
    TranslationResult, TranslationStage, TtsStage,
};

/// An inbound call as delivered by the telephony webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCall {
    pub caller: CallerId,
    /// Recording URL or local path
    pub recording: Option<String>,
    pub call_sid: Option<String>,
    /// Caller language, when the webhook carries a hint
    pub language: Option<LanguageTag>,
}

impl InboundCall {
    pub const fn new(caller: CallerId, recording: Option<String>) -> Self {
        Self {
            caller,
            recording,
            call_sid: None,
            language: None,
        }
    }

    #[must_use]
    pub fn with_call_sid(mut self, sid: impl Into<String>) -> Self {
        self.call_sid = Some(sid.into());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: LanguageTag) -> Self {
        self.language = Some(language);
        self
    }
}

/// Languages the pipeline works between
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Language questions are answered in
    pub working_language: LanguageTag,
    /// Caller language when the call carries no hint
    pub default_caller_language: LanguageTag,
    /// Passages retrieved per question
    pub retrieval_top_k: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            working_language: LanguageTag::english(),
            default_caller_language: LanguageTag::malayalam(),
            retrieval_top_k: 3,
        }
    }
}

/// Adapters the stages need besides the provider chains
#[derive(Clone)]
pub struct PipelineCollaborators {
    pub fetcher: Arc<dyn RecordingFetcher>,
    pub normalizer: Arc<dyn AudioNormalizer>,
    pub knowledge: Arc<dyn KnowledgeSource>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub text: Arc<dyn TextMessagingPort>,
    pub voice: Arc<dyn VoiceMessagingPort>,
    pub records: Arc<dyn QueryRecordStore>,
}

impl fmt::Debug for PipelineCollaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineCollaborators").finish_non_exhaustive()
    }
}

/// Everything that happened to one call
#[derive(Debug, Clone, Serialize)]
pub struct CallOutcome {
    pub session: CallSession,
    /// Working-language question; empty when nothing was recognized
    pub question: String,
    /// Text delivered to the caller
    pub delivered_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<TranslationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playable_url: Option<String>,
    pub notification: NotificationReport,
    /// Id of the stored record, `None` if persisting failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<QueryId>,
}

impl CallOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self.session.status(), CallStatus::Completed)
    }
}

/// What the content stages produced before delivery
enum Content {
    Answered {
        question: String,
        answer: Answer,
        translation: TranslationResult,
    },
    Fallback {
        kind: FallbackKind,
        question: String,
    },
}

/// Processes calls end to end; shared by every worker
pub struct CallPipelineService {
    audio: AudioAcquisitionStage,
    asr: AsrStage,
    answering: Arc<AnsweringStage>,
    translation: TranslationStage,
    tts: TtsStage,
    notification: NotificationStage,
    records: Arc<dyn QueryRecordStore>,
    settings: PipelineSettings,
}

impl fmt::Debug for CallPipelineService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallPipelineService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CallPipelineService {
    /// Wire the stages from the registry chains and the collaborators
    pub fn new(
        registry: &ProviderRegistry,
        collaborators: PipelineCollaborators,
        settings: PipelineSettings,
    ) -> Self {
        let PipelineCollaborators {
            fetcher,
            normalizer,
            knowledge,
            artifacts,
            text,
            voice,
            records,
        } = collaborators;

        Self {
            audio: AudioAcquisitionStage::new(fetcher, normalizer),
            asr: AsrStage::new(registry.asr(), settings.working_language.clone()),
            answering: Arc::new(AnsweringStage::new(
                registry.answer(),
                knowledge,
                settings.retrieval_top_k,
                settings.working_language.clone(),
            )),
            translation: TranslationStage::new(registry.translation()),
            tts: TtsStage::new(registry.tts(), artifacts),
            notification: NotificationStage::new(text, voice),
            records,
            settings,
        }
    }

    /// The answering stage, shared with the direct question API
    pub fn answering(&self) -> Arc<AnsweringStage> {
        Arc::clone(&self.answering)
    }

    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process one call to a terminal status
    ///
    /// Never fails: every stage error becomes a fallback message, and the
    /// returned outcome records what the caller received.
    #[instrument(skip(self, call), fields(caller = %call.caller, call_sid = call.call_sid.as_deref()))]
    pub async fn process(&self, call: InboundCall) -> CallOutcome {
        let caller_language = call
            .language
            .unwrap_or_else(|| self.settings.default_caller_language.clone());
        let mut session = CallSession::new(call.caller, call.recording, caller_language);
        if let Some(sid) = call.call_sid {
            session = session.with_call_sid(sid);
        }
        info!(session_id = %session.id, has_recording = session.has_recording(), "Call received");

        let content = self.produce_content(&mut session).await;

        let (question, delivered_text, delivery_language, fallback, translation, record) =
            match content {
                Content::Answered {
                    question,
                    answer,
                    translation,
                } => {
                    let language = if translation.is_skipped() {
                        answer.language.clone()
                    } else {
                        session.source_language.clone()
                    };
                    let record = NewQueryRecord::new(
                        session.caller.clone(),
                        question.clone(),
                        translation.text.clone(),
                    )
                    .with_sources(answer.sources.clone())
                    .with_confidence(answer.confidence);
                    (
                        question,
                        translation.text.clone(),
                        language,
                        None,
                        Some(translation),
                        record,
                    )
                },
                Content::Fallback { kind, question } => {
                    let language = session.source_language.clone();
                    let text = fallback_message(kind, &language).to_string();
                    warn!(fallback = %kind, "Delivering fallback message");
                    let record = NewQueryRecord::new(session.caller.clone(), question.clone(), text.clone())
                        .with_confidence(Confidence::UNKNOWN);
                    (question, text, language, Some(kind), None, record)
                },
            };

        advance(&mut session, CallStatus::Synthesizing);
        let playable = self
            .tts
            .synthesize(&session.caller, &delivered_text, &delivery_language)
            .await;

        advance(&mut session, CallStatus::Notifying);
        let body = match fallback {
            Some(_) => delivered_text.clone(),
            None => answer_sms_body(&delivered_text, &delivery_language),
        };
        let notification = self
            .notification
            .notify(&session.caller, &body, playable.as_ref())
            .await;

        let record_id = self.persist(QueryRecord::create(record)).await;

        let terminal = match fallback {
            None => session.complete(),
            Some(kind) => session.fail(kind.label()),
        };
        if let Err(e) = terminal {
            warn!(error = %e, "Could not close call session");
        }

        info!(
            status = %session.status(),
            fallback = fallback.map(FallbackKind::label),
            persisted = record_id.is_some(),
            "Call finished"
        );

        CallOutcome {
            session,
            question,
            delivered_text,
            fallback,
            translation,
            playable_url: playable.map(|p: PlayableRef| p.url),
            notification,
            record_id,
        }
    }

    async fn produce_content(&self, session: &mut CallSession) -> Content {
        let Some(recording) = session.recording.clone() else {
            return Content::Fallback {
                kind: FallbackKind::NoAudio,
                question: String::new(),
            };
        };

        advance(session, CallStatus::Transcribing);
        let audio = match self.audio.acquire(&recording).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!(error = %e, "Recording could not be acquired");
                return Content::Fallback {
                    kind: FallbackKind::Generic,
                    question: String::new(),
                };
            },
        };

        let hint = session.source_language.clone();
        let transcript = match self.asr.recognize(&audio, Some(&hint)).await {
            Ok(transcript) if !transcript.is_empty() => transcript,
            Ok(_) => {
                info!("Recognizer returned no speech");
                return Content::Fallback {
                    kind: FallbackKind::AudioUnclear,
                    question: String::new(),
                };
            },
            Err(exhausted) => {
                warn!(error = %exhausted, "Speech recognition exhausted");
                return Content::Fallback {
                    kind: FallbackKind::Generic,
                    question: String::new(),
                };
            },
        };
        drop(audio);

        advance(session, CallStatus::Answering);
        let question = transcript.text;
        let answer = match self.answering.answer(&question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "No answer available");
                return Content::Fallback {
                    kind: FallbackKind::NoAnswer,
                    question,
                };
            },
        };

        advance(session, CallStatus::Translating);
        let pair = LanguagePair::new(answer.language.clone(), session.source_language.clone());
        let translation = self.translation.translate(&answer.text, &pair).await;

        Content::Answered {
            question,
            answer,
            translation,
        }
    }

    async fn persist(&self, record: QueryRecord) -> Option<QueryId> {
        let id = record.id();
        match self.records.insert(&record).await {
            Ok(()) => Some(id),
            Err(e) => {
                error!(error = %e, record_id = %id, "Failed to persist query record");
                None
            },
        }
    }
}

fn advance(session: &mut CallSession, next: CallStatus) {
    if let Err(e) = session.advance(next) {
        warn!(error = %e, "Skipping invalid session transition");
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use domain::Transcript;
    use parking_lot::Mutex;

    use super::*;
    use crate::error::ApplicationError;
    use crate::ports::{
        AnswerPort, AudioClip, DeliveryMode, DeliveryReceipt, GeneratedAnswer, MockAnswerPort,
        MockArtifactStore, MockAudioNormalizer, MockKnowledgeSource, MockQueryRecordStore,
        MockRecordingFetcher, MockSpeechRecognitionPort, MockSpeechSynthesisPort,
        MockTextMessagingPort, MockTranslationPort, MockVoiceMessagingPort, SpeechRecognitionPort,
        SpeechSynthesisPort, SynthesizedAudio, TranslationOutcome, TranslationPort,
    };
    use crate::provider_chain::ProviderChain;
    use crate::stages::ChannelOutcome;

    const TIMEOUT: Duration = Duration::from_secs(5);
    const QUESTION: &str = "what is the weather for paddy today";

    struct Mocks {
        fetcher: MockRecordingFetcher,
        normalizer: MockAudioNormalizer,
        knowledge: MockKnowledgeSource,
        artifacts: MockArtifactStore,
        text: MockTextMessagingPort,
        voice: MockVoiceMessagingPort,
        records: MockQueryRecordStore,
        asr: MockSpeechRecognitionPort,
        answer: MockAnswerPort,
        translation: MockTranslationPort,
        tts: MockSpeechSynthesisPort,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                fetcher: MockRecordingFetcher::new(),
                normalizer: MockAudioNormalizer::new(),
                knowledge: MockKnowledgeSource::new(),
                artifacts: MockArtifactStore::new(),
                text: MockTextMessagingPort::new(),
                voice: MockVoiceMessagingPort::new(),
                records: MockQueryRecordStore::new(),
                asr: MockSpeechRecognitionPort::new(),
                answer: MockAnswerPort::new(),
                translation: MockTranslationPort::new(),
                tts: MockSpeechSynthesisPort::new(),
            }
        }

        fn stub_delivery(&mut self) {
            self.tts.expect_synthesize().returning(|_, _| {
                Ok(SynthesizedAudio {
                    data: b"ID3".to_vec(),
                    mime_type: "audio/mpeg".to_string(),
                })
            });
            self.artifacts.expect_save().returning(|name, _| {
                Ok(PlayableRef {
                    path: PathBuf::from("/tmp/tts").join(name),
                    url: format!("http://localhost:8000/static/tts/{name}"),
                })
            });
            self.text
                .expect_send_text()
                .returning(|_, _| Ok(DeliveryReceipt::stub()));
            self.voice
                .expect_play_audio()
                .returning(|_, _| Ok(DeliveryReceipt::stub()));
        }

        fn capture_records(&mut self) -> Arc<Mutex<Vec<QueryRecord>>> {
            let stored = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&stored);
            self.records.expect_insert().returning(move |record| {
                sink.lock().push(record.clone());
                Ok(())
            });
            stored
        }

        fn build(self) -> CallPipelineService {
            let registry = ProviderRegistry::new(
                ProviderChain::new("asr", TIMEOUT)
                    .with_provider("whisper_cpp", Arc::new(self.asr) as Arc<dyn SpeechRecognitionPort>),
                ProviderChain::new("answer", TIMEOUT)
                    .with_provider("openai", Arc::new(self.answer) as Arc<dyn AnswerPort>),
                ProviderChain::new("translation", TIMEOUT).with_provider(
                    "libretranslate",
                    Arc::new(self.translation) as Arc<dyn TranslationPort>,
                ),
                ProviderChain::new("tts", TIMEOUT)
                    .with_provider("gtts", Arc::new(self.tts) as Arc<dyn SpeechSynthesisPort>),
            )
            .unwrap();

            CallPipelineService::new(
                &registry,
                PipelineCollaborators {
                    fetcher: Arc::new(self.fetcher),
                    normalizer: Arc::new(self.normalizer),
                    knowledge: Arc::new(self.knowledge),
                    artifacts: Arc::new(self.artifacts),
                    text: Arc::new(self.text),
                    voice: Arc::new(self.voice),
                    records: Arc::new(self.records),
                },
                PipelineSettings::default(),
            )
        }
    }

    fn farmer_call() -> InboundCall {
        InboundCall::new(
            CallerId::new("+91999").unwrap(),
            Some("http://x/a.wav".to_string()),
        )
        .with_call_sid("CA123")
    }

    fn expect_audio(mocks: &mut Mocks) {
        mocks
            .fetcher
            .expect_fetch()
            .withf(|r| r == "http://x/a.wav")
            .returning(|_| Ok(AudioClip::new(b"RIFF....WAVE".to_vec(), "audio/wav")));
        mocks.normalizer.expect_normalize().returning(Ok);
    }

    #[tokio::test]
    async fn answered_call_is_translated_synthesized_notified_and_persisted() {
        let mut mocks = Mocks::new();
        expect_audio(&mut mocks);
        mocks
            .asr
            .expect_recognize()
            .withf(|_, options| options.output_language.as_str() == "en")
            .returning(|_, _| Ok(Transcript::new(QUESTION, Confidence::new(0.9), "")));
        mocks.knowledge.expect_passages().returning(|| Ok(Vec::new()));
        mocks
            .answer
            .expect_answer()
            .withf(|prompt| prompt.source_ids.len() == 2 && prompt.user.contains(QUESTION))
            .returning(|_| {
                Ok(GeneratedAnswer {
                    text: "Light rain is expected, delay spraying.".to_string(),
                    confidence: Confidence::UNKNOWN,
                })
            });
        mocks
            .translation
            .expect_translate()
            .withf(|_, pair| pair.to_string() == "en-ml")
            .times(1)
            .returning(|_, _| Ok(TranslationOutcome::Translated("നേരിയ മഴ".to_string())));
        mocks.stub_delivery();
        let stored = mocks.capture_records();

        let outcome = mocks.build().process(farmer_call()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.session.status(), CallStatus::Completed);
        assert_eq!(outcome.session.call_sid.as_deref(), Some("CA123"));
        assert_eq!(outcome.question, QUESTION);
        assert_eq!(outcome.delivered_text, "നേരിയ മഴ");
        assert!(outcome.fallback.is_none());
        assert!(
            outcome
                .playable_url
                .as_deref()
                .unwrap()
                .ends_with("/tts_91999.mp3")
        );
        assert!(matches!(
            outcome.notification.text,
            ChannelOutcome::Sent {
                mode: DeliveryMode::Stub,
                ..
            }
        ));

        let stored = stored.lock();
        assert_eq!(stored.len(), 1);
        let record = &stored[0];
        assert_eq!(Some(record.id()), outcome.record_id);
        assert_eq!(record.caller().as_str(), "+91999");
        assert_eq!(record.question(), QUESTION);
        assert_eq!(record.answer(), "നേരിയ മഴ");
        assert_eq!(record.sources().len(), 2);
        assert!(record.confidence().value().abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn missing_recording_delivers_no_audio_message_only() {
        let mut mocks = Mocks::new();
        mocks.fetcher.expect_fetch().never();
        mocks.asr.expect_recognize().never();
        mocks.answer.expect_answer().never();
        mocks.translation.expect_translate().never();
        mocks
            .tts
            .expect_synthesize()
            .withf(|text, lang| {
                text == fallback_message(FallbackKind::NoAudio, &LanguageTag::malayalam())
                    && lang.as_str() == "ml"
            })
            .times(1)
            .returning(|_, _| {
                Ok(SynthesizedAudio {
                    data: b"ID3".to_vec(),
                    mime_type: "audio/mpeg".to_string(),
                })
            });
        mocks.artifacts.expect_save().returning(|name, _| {
            Ok(PlayableRef {
                path: PathBuf::from(name),
                url: format!("http://localhost:8000/static/tts/{name}"),
            })
        });
        mocks
            .text
            .expect_send_text()
            .times(1)
            .returning(|_, _| Ok(DeliveryReceipt::stub()));
        mocks
            .voice
            .expect_play_audio()
            .times(1)
            .returning(|_, _| Ok(DeliveryReceipt::stub()));
        let stored = mocks.capture_records();

        let outcome = mocks
            .build()
            .process(InboundCall::new(CallerId::new("+91999").unwrap(), None))
            .await;

        assert_eq!(outcome.fallback, Some(FallbackKind::NoAudio));
        assert_eq!(outcome.session.status(), CallStatus::Failed);
        assert_eq!(outcome.session.failure_reason.as_deref(), Some("no_audio"));
        let stored = stored.lock();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].question(), "");
        assert_eq!(
            stored[0].answer(),
            fallback_message(FallbackKind::NoAudio, &LanguageTag::malayalam())
        );
    }

    #[tokio::test]
    async fn empty_transcript_skips_answering() {
        let mut mocks = Mocks::new();
        expect_audio(&mut mocks);
        mocks
            .asr
            .expect_recognize()
            .returning(|_, _| Ok(Transcript::new("  ", Confidence::UNKNOWN, "whisper_cpp")));
        mocks.answer.expect_answer().never();
        mocks.translation.expect_translate().never();
        mocks.stub_delivery();
        let stored = mocks.capture_records();

        let outcome = mocks.build().process(farmer_call()).await;

        assert_eq!(outcome.fallback, Some(FallbackKind::AudioUnclear));
        assert_eq!(outcome.session.status(), CallStatus::Failed);
        assert_eq!(stored.lock().len(), 1);
    }

    #[tokio::test]
    async fn exhausted_recognition_is_generic_not_unclear() {
        let mut mocks = Mocks::new();
        expect_audio(&mut mocks);
        mocks
            .asr
            .expect_recognize()
            .returning(|_, _| Err(ApplicationError::Speech("model missing".to_string())));
        mocks.answer.expect_answer().never();
        mocks.translation.expect_translate().never();
        mocks.stub_delivery();
        let stored = mocks.capture_records();

        let outcome = mocks.build().process(farmer_call()).await;

        assert_eq!(outcome.fallback, Some(FallbackKind::Generic));
        assert_eq!(outcome.session.status(), CallStatus::Failed);
        let stored = stored.lock();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored[0].answer(),
            fallback_message(FallbackKind::Generic, &LanguageTag::malayalam())
        );
    }

    #[tokio::test]
    async fn exhausted_answering_uses_no_answer_message() {
        let mut mocks = Mocks::new();
        expect_audio(&mut mocks);
        mocks
            .asr
            .expect_recognize()
            .returning(|_, _| Ok(Transcript::new(QUESTION, Confidence::UNKNOWN, "openai")));
        mocks.knowledge.expect_passages().returning(|| Ok(Vec::new()));
        mocks
            .answer
            .expect_answer()
            .returning(|_| Err(ApplicationError::Inference("connection refused".to_string())));
        mocks.translation.expect_translate().never();
        mocks.stub_delivery();
        let stored = mocks.capture_records();

        let outcome = mocks
            .build()
            .process(farmer_call().with_language(LanguageTag::english()))
            .await;

        assert_eq!(outcome.fallback, Some(FallbackKind::NoAnswer));
        let stored = stored.lock();
        assert_eq!(stored[0].question(), QUESTION);
        assert!(!stored[0].answer().is_empty());
        assert!(stored[0].answer().contains("Krishi Bhavan"));
    }

    #[tokio::test]
    async fn fetch_failure_is_generic_and_history_reaches_failed() {
        let mut mocks = Mocks::new();
        mocks
            .fetcher
            .expect_fetch()
            .returning(|_| Err(ApplicationError::AudioAcquisition("HTTP 404".to_string())));
        mocks.asr.expect_recognize().never();
        mocks.stub_delivery();
        let _stored = mocks.capture_records();

        let outcome = mocks.build().process(farmer_call()).await;

        assert_eq!(outcome.fallback, Some(FallbackKind::Generic));
        assert_eq!(
            outcome.session.history().collect::<Vec<_>>(),
            vec![
                CallStatus::Received,
                CallStatus::Transcribing,
                CallStatus::Synthesizing,
                CallStatus::Notifying,
                CallStatus::Failed,
            ]
        );
    }

    #[tokio::test]
    async fn untranslatable_pair_delivers_working_language_text() {
        let mut mocks = Mocks::new();
        expect_audio(&mut mocks);
        mocks
            .asr
            .expect_recognize()
            .returning(|_, _| Ok(Transcript::new(QUESTION, Confidence::UNKNOWN, "openai")));
        mocks.knowledge.expect_passages().returning(|| Ok(Vec::new()));
        mocks.answer.expect_answer().returning(|_| {
            Ok(GeneratedAnswer {
                text: "Delay spraying.".to_string(),
                confidence: Confidence::new(0.4),
            })
        });
        mocks
            .translation
            .expect_translate()
            .returning(|_, _| Ok(TranslationOutcome::Unsupported));
        mocks
            .tts
            .expect_synthesize()
            .withf(|_, lang| lang.as_str() == "en")
            .returning(|_, _| {
                Ok(SynthesizedAudio {
                    data: b"ID3".to_vec(),
                    mime_type: "audio/mpeg".to_string(),
                })
            });
        mocks.artifacts.expect_save().returning(|name, _| {
            Ok(PlayableRef {
                path: PathBuf::from(name),
                url: name.to_string(),
            })
        });
        mocks
            .text
            .expect_send_text()
            .withf(|_, body| body.contains("Your question") && body.contains("Delay spraying."))
            .returning(|_, _| Ok(DeliveryReceipt::live("SM1")));
        mocks
            .voice
            .expect_play_audio()
            .returning(|_, _| Ok(DeliveryReceipt::live("CA1")));
        let stored = mocks.capture_records();

        let outcome = mocks.build().process(farmer_call()).await;

        assert!(outcome.is_success());
        assert!(outcome.translation.as_ref().unwrap().is_skipped());
        assert_eq!(outcome.delivered_text, "Delay spraying.");
        assert!((stored.lock()[0].confidence().value() - 0.4).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn delivery_failures_do_not_prevent_persistence() {
        let mut mocks = Mocks::new();
        mocks
            .tts
            .expect_synthesize()
            .returning(|_, _| Err(ApplicationError::Speech("offline".to_string())));
        mocks.artifacts.expect_save().never();
        mocks
            .text
            .expect_send_text()
            .returning(|_, _| Err(ApplicationError::Notification("401".to_string())));
        mocks.voice.expect_play_audio().never();
        let stored = mocks.capture_records();

        let outcome = mocks
            .build()
            .process(InboundCall::new(CallerId::new("+91999").unwrap(), None))
            .await;

        assert!(outcome.playable_url.is_none());
        assert!(outcome.notification.text.is_failed());
        assert!(matches!(outcome.notification.voice, ChannelOutcome::Skipped { .. }));
        assert_eq!(stored.lock().len(), 1);
    }

    #[tokio::test]
    async fn persistence_failure_still_finishes_the_call() {
        let mut mocks = Mocks::new();
        mocks.stub_delivery();
        mocks
            .records
            .expect_insert()
            .times(1)
            .returning(|_| Err(ApplicationError::Persistence("disk I/O error".to_string())));

        let outcome = mocks
            .build()
            .process(InboundCall::new(CallerId::new("+91999").unwrap(), None))
            .await;

        assert!(outcome.record_id.is_none());
        assert_eq!(outcome.session.status(), CallStatus::Failed);
    }
}
