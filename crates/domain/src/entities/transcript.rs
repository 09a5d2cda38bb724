//! Speech recognition result

use serde::{Deserialize, Serialize};

use crate::value_objects::{Confidence, LanguageTag};

/// Text recognized from a call recording.
///
/// Empty text is a valid result: the recording was silent or unintelligible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Recognized text in the working language
    pub text: String,
    /// Recognition confidence
    pub confidence: Confidence,
    /// Provider that produced the text
    pub provider: String,
    /// Language the speaker used, when the provider detected it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<LanguageTag>,
}

impl Transcript {
    /// Create a transcript; surrounding whitespace is trimmed
    pub fn new(text: impl Into<String>, confidence: Confidence, provider: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            confidence,
            provider: provider.into(),
            detected_language: None,
        }
    }

    /// Set the detected language
    #[must_use]
    pub fn with_detected_language(mut self, language: LanguageTag) -> Self {
        self.detected_language = Some(language);
        self
    }

    /// No speech was recognized
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
