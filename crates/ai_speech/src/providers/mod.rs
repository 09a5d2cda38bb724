//! Concrete speech providers

pub mod google_tts;
pub mod gtts;
pub mod openai;
pub mod whisper_cpp;

pub use google_tts::GoogleCloudTtsProvider;
pub use gtts::GttsProvider;
pub use openai::OpenAiWhisperProvider;
pub use whisper_cpp::WhisperCppProvider;
