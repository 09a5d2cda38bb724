//! Google Translate speech endpoint, as used by gTTS
//!
//! Needs no credentials. The endpoint only accepts short inputs, so text
//! is split on word boundaries and the returned MP3 frames are concatenated.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::GttsConfig;
use crate::error::SpeechError;
use crate::ports::TextToSpeech;
use crate::types::{AudioData, AudioFormat};

/// Keyless TTS through `translate_tts`
#[derive(Debug, Clone)]
pub struct GttsProvider {
    client: Client,
    config: GttsConfig,
}

impl GttsProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: GttsConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/translate_tts", self.config.base_url.trim_end_matches('/'))
    }
}

/// Split `text` into pieces of at most `max_chars` characters, preferring
/// whitespace boundaries. Words longer than the limit are hard-split.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl TextToSpeech for GttsProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), language = %language))]
    async fn synthesize(&self, text: &str, language: &str) -> Result<AudioData, SpeechError> {
        let chunks = chunk_text(text, self.config.chunk_chars);
        if chunks.is_empty() {
            return Err(SpeechError::SynthesisFailed("Text is empty".to_string()));
        }

        let lang = language.split('-').next().unwrap_or(language);
        let total = chunks.len().to_string();
        let mut audio = BytesMut::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let response = self
                .client
                .get(self.endpoint())
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", lang),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await
                .map_err(|e| SpeechError::from_reqwest(&e, self.config.timeout_ms))?;

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(SpeechError::RateLimited);
            }
            if !status.is_success() {
                return Err(SpeechError::SynthesisFailed(format!(
                    "HTTP {status} for chunk {idx}"
                )));
            }

            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Err(SpeechError::SynthesisFailed(format!(
                    "Empty audio for chunk {idx}"
                )));
            }
            audio.extend_from_slice(&bytes);
        }

        debug!(chunks = chunks.len(), audio_size = audio.len(), "gTTS synthesis complete");
        Ok(AudioData::new(audio.freeze(), AudioFormat::Mp3))
    }

    fn provider_name(&self) -> &'static str {
        "gtts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        assert_eq!(chunk_text("hello world", 100), vec!["hello world"]);
    }

    #[test]
    fn whitespace_only_yields_no_chunks() {
        assert!(chunk_text("  \n\t ", 100).is_empty());
    }

    #[test]
    fn splits_on_word_boundaries() {
        let chunks = chunk_text("aaa bbb ccc ddd", 7);
        assert_eq!(chunks, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn long_words_are_hard_split() {
        let chunks = chunk_text("ab abcdefghij cd", 4);
        assert_eq!(chunks, vec!["ab", "abcd", "efgh", "ij", "cd"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // five Malayalam code points, fifteen UTF-8 bytes
        let word = "നമസ്ക";
        assert_eq!(chunk_text(word, 5), vec![word]);
    }

    #[test]
    fn no_chunk_exceeds_limit() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(20);
        for chunk in chunk_text(&text, 30) {
            assert!(chunk.chars().count() <= 30, "{chunk}");
        }
    }
}
