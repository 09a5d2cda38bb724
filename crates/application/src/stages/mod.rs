//! Pipeline stages
//!
//! Each stage wraps one capability. The call pipeline runs them in order and
//! decides what a stage failure means for the caller.

mod answering;
mod asr;
mod audio;
mod notification;
mod translation;
mod tts;

pub use answering::AnsweringStage;
pub use asr::AsrStage;
pub use audio::AudioAcquisitionStage;
pub use notification::{ChannelOutcome, NotificationReport, NotificationStage};
pub use translation::{TranslationResult, TranslationStage, TranslationStatus};
pub use tts::{TtsStage, tts_file_name};
