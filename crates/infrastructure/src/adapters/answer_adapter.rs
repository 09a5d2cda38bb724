//! Answer adapter - any ai_core inference engine behind the answer port

use std::sync::Arc;
use std::time::Instant;

use ai_core::{InferenceEngine, InferenceError, InferenceRequest};
use application::error::ApplicationError;
use application::ports::{AnswerPort, GeneratedAnswer, GroundedPrompt};
use async_trait::async_trait;
use domain::Confidence;
use tracing::{debug, instrument};

/// Convert ai_core error to application error
pub fn map_inference_error(e: InferenceError) -> ApplicationError {
    match e {
        InferenceError::RateLimited => ApplicationError::RateLimited,
        InferenceError::ConnectionFailed(msg) => {
            ApplicationError::ExternalService(format!("Inference connection failed: {msg}"))
        },
        InferenceError::Timeout(ms) => {
            ApplicationError::ExternalService(format!("Inference timeout after {ms}ms"))
        },
        InferenceError::Configuration(msg) => ApplicationError::Configuration(msg),
        InferenceError::UnsupportedPair {
            source_lang,
            target_lang,
        } => ApplicationError::TranslationUnsupported {
            source_lang,
            target_lang,
        },
        other => ApplicationError::Inference(other.to_string()),
    }
}

/// Answers grounded prompts with one inference engine
pub struct InferenceAnswerAdapter {
    engine: Arc<dyn InferenceEngine>,
}

impl std::fmt::Debug for InferenceAnswerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceAnswerAdapter")
            .field("engine", &self.engine.engine_name())
            .field("model", &self.engine.default_model())
            .finish()
    }
}

impl InferenceAnswerAdapter {
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl AnswerPort for InferenceAnswerAdapter {
    #[instrument(
        skip(self, prompt),
        fields(engine = self.engine.engine_name(), sources = prompt.source_ids.len())
    )]
    async fn answer(&self, prompt: &GroundedPrompt) -> Result<GeneratedAnswer, ApplicationError> {
        let start = Instant::now();
        let request = InferenceRequest::with_system(&prompt.system, &prompt.user);

        let response = self
            .engine
            .generate(request)
            .await
            .map_err(map_inference_error)?;

        let text = response.content.trim();
        if text.is_empty() {
            return Err(ApplicationError::Inference(format!(
                "{} returned an empty completion",
                self.engine.engine_name()
            )));
        }

        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(
            model = %response.model,
            tokens = ?response.usage.map(|u| u.total_tokens),
            latency_ms,
            "Answer generated"
        );

        // engines report no calibrated confidence
        Ok(GeneratedAnswer {
            text: text.to_string(),
            confidence: Confidence::UNKNOWN,
        })
    }
}
