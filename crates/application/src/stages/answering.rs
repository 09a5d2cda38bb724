//! Retrieval-grounded question answering

use std::sync::Arc;

use domain::{Answer, Confidence, LanguageTag};
use tracing::{info, instrument, warn};

use crate::error::ApplicationError;
use crate::fallback_messages::empty_question_message;
use crate::knowledge::{default_corpus, rank_passages};
use crate::ports::{AnswerPort, GroundedPrompt, KnowledgeSource, Passage};
use crate::provider_chain::ProviderChain;

/// Answers working-language questions from the passage corpus
pub struct AnsweringStage {
    chain: Arc<ProviderChain<dyn AnswerPort>>,
    knowledge: Arc<dyn KnowledgeSource>,
    top_k: usize,
    working_language: LanguageTag,
}

impl std::fmt::Debug for AnsweringStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnsweringStage")
            .field("chain", &self.chain)
            .field("top_k", &self.top_k)
            .field("working_language", &self.working_language)
            .finish_non_exhaustive()
    }
}

impl AnsweringStage {
    pub fn new(
        chain: Arc<ProviderChain<dyn AnswerPort>>,
        knowledge: Arc<dyn KnowledgeSource>,
        top_k: usize,
        working_language: LanguageTag,
    ) -> Self {
        Self {
            chain,
            knowledge,
            top_k: top_k.max(1),
            working_language,
        }
    }

    /// The `top_k` passages most relevant to `question`
    ///
    /// An empty or unreadable corpus is replaced by the built-in passages.
    pub async fn retrieve(&self, question: &str) -> Vec<Passage> {
        let corpus = match self.knowledge.passages().await {
            Ok(passages) if !passages.is_empty() => passages,
            Ok(_) => default_corpus(),
            Err(e) => {
                warn!(error = %e, "Knowledge corpus unavailable, using built-in passages");
                default_corpus()
            },
        };
        rank_passages(question, corpus, self.top_k)
    }

    /// Answer `question`
    ///
    /// A blank question gets a fixed prompt to ask again, without calling
    /// any model.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::ChainExhausted` when every model fails.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn answer(&self, question: &str) -> Result<Answer, ApplicationError> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(Answer::new(
                empty_question_message(&self.working_language),
                Vec::new(),
                Confidence::UNKNOWN,
                self.working_language.clone(),
            ));
        }

        let passages = self.retrieve(question).await;
        let prompt = GroundedPrompt::build(
            question,
            &passages,
            language_display_name(&self.working_language),
        );
        let prompt_ref = &prompt;

        let success = self
            .chain
            .run(|provider| async move {
                let generated = provider.answer(prompt_ref).await?;
                if generated.text.trim().is_empty() {
                    return Err(ApplicationError::Inference(
                        "model returned an empty answer".to_string(),
                    ));
                }
                Ok(generated)
            })
            .await?;

        info!(
            provider = success.provider_id,
            sources = prompt.source_ids.len(),
            "Answer generated"
        );

        Ok(Answer::new(
            success.value.text.trim(),
            prompt.source_ids,
            success.value.confidence,
            self.working_language.clone(),
        ))
    }
}

fn language_display_name(language: &LanguageTag) -> &'static str {
    match language.primary() {
        "ml" => "Malayalam",
        "hi" => "Hindi",
        "ta" => "Tamil",
        _ => "English",
    }
}
