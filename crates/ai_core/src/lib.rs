//! AI Core - language model inference and text translation
//!
//! Engines speak to an Ollama server or an OpenAI-compatible API. Translators
//! sit on a LibreTranslate server or on any inference engine, and cache their
//! per-pair resources lazily.

pub mod config;
pub mod error;
pub mod ollama;
pub mod openai;
pub mod ports;
pub mod translation;

pub use config::{InferenceConfig, LibreTranslateConfig, LlmTranslatorConfig, OpenAiChatConfig};
pub use error::InferenceError;
pub use ollama::OllamaInferenceEngine;
pub use openai::OpenAiChatEngine;
pub use ports::{
    InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage,
    Translator,
};
pub use translation::{LibreTranslator, LlmTranslator, PairRegistry, language_name};
