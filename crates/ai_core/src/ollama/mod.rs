//! Ollama inference engine
//!
//! Talks to the native `/api/chat` endpoint of a local Ollama server.

mod client;

pub use client::OllamaInferenceEngine;
