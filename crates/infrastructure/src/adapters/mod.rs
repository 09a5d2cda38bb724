//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod answer_adapter;
mod artifact_store;
mod knowledge_base;
mod messaging_adapter;
mod recording_fetcher;
mod speech_adapter;
mod translation_adapter;

pub use answer_adapter::{InferenceAnswerAdapter, map_inference_error};
pub use artifact_store::FsArtifactStore;
pub use knowledge_base::FileKnowledgeBase;
pub use messaging_adapter::TwilioMessagingAdapter;
pub use recording_fetcher::HttpRecordingFetcher;
pub use speech_adapter::{
    FfmpegNormalizer, SpeechRecognitionAdapter, SpeechSynthesisAdapter, map_speech_error,
};
pub use translation_adapter::TranslatorAdapter;
