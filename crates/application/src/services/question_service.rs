//! Question service - direct text questions and the record listing

use std::fmt;
use std::sync::Arc;

use domain::{CallerId, Confidence, LanguageTag, NewQueryRecord, QueryId, QueryRecord};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::ApplicationError;
use crate::fallback_messages::{FallbackKind, fallback_message};
use crate::ports::QueryRecordStore;
use crate::stages::AnsweringStage;

/// Reply to a direct question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnsweredQuestion {
    pub id: QueryId,
    pub question: String,
    pub answer: String,
}

/// Answers typed questions without the audio stages
pub struct QuestionService {
    answering: Arc<AnsweringStage>,
    records: Arc<dyn QueryRecordStore>,
    working_language: LanguageTag,
}

impl fmt::Debug for QuestionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuestionService")
            .field("working_language", &self.working_language)
            .finish_non_exhaustive()
    }
}

impl QuestionService {
    pub fn new(
        answering: Arc<AnsweringStage>,
        records: Arc<dyn QueryRecordStore>,
        working_language: LanguageTag,
    ) -> Self {
        Self {
            answering,
            records,
            working_language,
        }
    }

    /// Answer `question` in the working language and record it as the API user
    ///
    /// When no model can answer, the "no answer" message is returned and
    /// recorded instead.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Persistence` if the record cannot be stored.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn ask(&self, question: &str) -> Result<AnsweredQuestion, ApplicationError> {
        let question = question.trim();

        let record = match self.answering.answer(question).await {
            Ok(answer) => NewQueryRecord::new(CallerId::api_user(), question, answer.text.clone())
                .with_sources(answer.sources)
                .with_confidence(answer.confidence),
            Err(e) => {
                warn!(error = %e, "No answer available for direct question");
                NewQueryRecord::new(
                    CallerId::api_user(),
                    question,
                    fallback_message(FallbackKind::NoAnswer, &self.working_language),
                )
                .with_confidence(Confidence::UNKNOWN)
            },
        };

        let record = QueryRecord::create(record);
        self.records.insert(&record).await?;
        info!(record_id = %record.id(), "Direct question answered");

        Ok(AnsweredQuestion {
            id: record.id(),
            question: record.question().to_string(),
            answer: record.answer().to_string(),
        })
    }

    /// Stored records, newest first
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Persistence` if the store cannot be read.
    pub async fn list(&self, limit: Option<u32>) -> Result<Vec<QueryRecord>, ApplicationError> {
        self.records.list_newest_first(limit).await
    }
}
