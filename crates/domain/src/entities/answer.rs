//! Answer produced by the query answering stage

use serde::{Deserialize, Serialize};

use crate::value_objects::{Confidence, LanguageTag};

/// A grounded answer with its citations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text
    pub text: String,
    /// Identifiers of the passages the answer was grounded on, in prompt order
    pub sources: Vec<String>,
    /// Model confidence, `0.0` when the provider gives none
    pub confidence: Confidence,
    /// Language of `text`
    pub language: LanguageTag,
}

impl Answer {
    /// Create an answer
    pub fn new(
        text: impl Into<String>,
        sources: Vec<String>,
        confidence: Confidence,
        language: LanguageTag,
    ) -> Self {
        Self {
            text: text.into(),
            sources,
            confidence,
            language,
        }
    }

    /// Serialized citation list as stored with a query record
    pub fn sources_json(&self) -> String {
        serde_json::to_string(&self.sources).unwrap_or_else(|_| "[]".to_string())
    }
}
