//! Persisted record of one answered (or fallen-back) question

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{CallerId, Confidence, QueryId};

/// Data needed to create a query record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQueryRecord {
    pub caller: CallerId,
    pub question: String,
    pub answer: String,
    pub sources: Vec<String>,
    pub confidence: Confidence,
}

impl NewQueryRecord {
    /// Create a record draft with no sources and unknown confidence
    pub fn new(caller: CallerId, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            caller,
            question: question.into(),
            answer: answer.into(),
            sources: Vec::new(),
            confidence: Confidence::UNKNOWN,
        }
    }

    /// Set the citation list
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Set the confidence
    #[must_use]
    pub const fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }
}

/// An immutable, persisted query record.
///
/// Fields are read-only; records are only created through
/// [`QueryRecord::create`] or rehydrated from storage with [`QueryRecord::restore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    id: QueryId,
    caller: CallerId,
    question: String,
    answer: String,
    sources: Vec<String>,
    confidence: Confidence,
    created_at: DateTime<Utc>,
}

impl QueryRecord {
    /// Assign an id and creation time to a draft
    pub fn create(new: NewQueryRecord) -> Self {
        Self {
            id: QueryId::new(),
            caller: new.caller,
            question: new.question,
            answer: new.answer,
            sources: new.sources,
            confidence: new.confidence,
            created_at: Utc::now(),
        }
    }

    /// Rebuild a record read back from storage
    pub fn restore(
        id: QueryId,
        new: NewQueryRecord,
        created_at: DateTime<Utc>,
    ) -> Self {
        let NewQueryRecord {
            caller,
            question,
            answer,
            sources,
            confidence,
        } = new;
        Self {
            id,
            caller,
            question,
            answer,
            sources,
            confidence,
            created_at,
        }
    }

    pub const fn id(&self) -> QueryId {
        self.id
    }

    pub const fn caller(&self) -> &CallerId {
        &self.caller
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Citation list as a JSON array string
    pub fn sources_json(&self) -> String {
        serde_json::to_string(&self.sources).unwrap_or_else(|_| "[]".to_string())
    }

    pub const fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_defaults() {
        let draft = NewQueryRecord::new(CallerId::api_user(), "q", "a");
        assert!(draft.sources.is_empty());
        assert_eq!(draft.confidence, Confidence::UNKNOWN);
    }

    #[test]
    fn create_assigns_id_and_timestamp() {
        let before = Utc::now();
        let record = QueryRecord::create(
            NewQueryRecord::new(CallerId::new("+91999").unwrap(), "q", "a")
                .with_sources(vec!["kb1".to_string()])
                .with_confidence(Confidence::new(0.5)),
        );
        assert!(record.created_at() >= before);
        assert_eq!(record.caller().as_str(), "+91999");
        assert_eq!(record.sources_json(), r#"["kb1"]"#);
        assert!((record.confidence().value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn restore_keeps_identity() {
        let id = QueryId::new();
        let at = Utc::now();
        let record = QueryRecord::restore(id, NewQueryRecord::new(CallerId::unknown(), "", "x"), at);
        assert_eq!(record.id(), id);
        assert_eq!(record.created_at(), at);
        assert_eq!(record.question(), "");
    }
}
