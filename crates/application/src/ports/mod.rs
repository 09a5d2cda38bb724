//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod answer_port;
mod artifact_store;
mod knowledge_port;
mod messaging_port;
mod query_record_store;
mod recording_port;
mod speech_recognition_port;
mod speech_synthesis_port;
mod translation_port;

pub use answer_port::{AnswerPort, GeneratedAnswer, GroundedPrompt};
#[cfg(test)]
pub use answer_port::MockAnswerPort;
pub use artifact_store::{ArtifactStore, PlayableRef, is_safe_artifact_name};
#[cfg(test)]
pub use artifact_store::MockArtifactStore;
pub use knowledge_port::{KnowledgeSource, Passage};
#[cfg(test)]
pub use knowledge_port::MockKnowledgeSource;
pub use messaging_port::{DeliveryMode, DeliveryReceipt, TextMessagingPort, VoiceMessagingPort};
#[cfg(test)]
pub use messaging_port::{MockTextMessagingPort, MockVoiceMessagingPort};
pub use query_record_store::QueryRecordStore;
#[cfg(test)]
pub use query_record_store::MockQueryRecordStore;
pub use recording_port::{AudioClip, AudioNormalizer, RecordingFetcher};
#[cfg(test)]
pub use recording_port::{MockAudioNormalizer, MockRecordingFetcher};
pub use speech_recognition_port::{RecognitionOptions, SpeechRecognitionPort};
#[cfg(test)]
pub use speech_recognition_port::MockSpeechRecognitionPort;
pub use speech_synthesis_port::{SpeechSynthesisPort, SynthesizedAudio};
#[cfg(test)]
pub use speech_synthesis_port::MockSpeechSynthesisPort;
pub use translation_port::{TranslationOutcome, TranslationPort};
#[cfg(test)]
pub use translation_port::MockTranslationPort;
