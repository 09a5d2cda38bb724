//! AI Speech - recognition and synthesis providers
//!
//! Provides traits and implementations for speech processing:
//! - `SpeechToText` - recognize (and optionally translate) call audio
//! - `TextToSpeech` - synthesize the spoken answer
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//! - `converter` normalizes recordings to mono 16 kHz WAV via FFmpeg
//!
//! # Supported Providers
//!
//! - OpenAI Whisper (STT, translate mode)
//! - whisper.cpp CLI (local STT)
//! - Google Cloud Text-to-Speech
//! - Google Translate speech endpoint (gTTS, keyless)
//!
//! # Example
//!
//! ```ignore
//! use ai_speech::{AudioConverter, AudioData, AudioFormat, SpeechToText, TranscribeOptions};
//!
//! let canonical = AudioConverter::new().to_canonical(&audio).await?;
//! let transcription = provider
//!     .transcribe(&canonical, &TranscribeOptions::translate(Some("ml".into())))
//!     .await?;
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod ports;
pub mod providers;
pub mod types;

pub use config::{GoogleTtsConfig, GttsConfig, OpenAiSttConfig, WhisperCppConfig};
pub use converter::AudioConverter;
pub use error::SpeechError;
pub use ports::{SpeechToText, TextToSpeech};
pub use providers::{GoogleCloudTtsProvider, GttsProvider, OpenAiWhisperProvider, WhisperCppProvider};
pub use types::{AudioData, AudioFormat, TranscribeOptions, Transcription, WavSpec};
