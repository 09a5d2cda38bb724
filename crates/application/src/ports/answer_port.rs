//! Answer port - grounded question answering by a language model

use async_trait::async_trait;
use domain::Confidence;
#[cfg(test)]
use mockall::automock;

use super::knowledge_port::Passage;
use crate::error::ApplicationError;

/// Separator placed between passages in the prompt context
pub const PASSAGE_SEPARATOR: &str = "\n---\n";

/// A question together with the passages the answer must rest on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundedPrompt {
    pub system: String,
    pub user: String,
    /// Passage ids in the order they appear in the context
    pub source_ids: Vec<String>,
}

impl GroundedPrompt {
    /// Build the agricultural assistant prompt for `question`
    pub fn build(question: &str, passages: &[Passage], answer_language: &str) -> Self {
        let context = passages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR);

        let system = format!(
            "You are an agricultural assistant for Kerala farmers. \
             Use the context to reply in {answer_language} in short simple steps. \
             If the context does not cover the question, give safe general advice \
             and suggest visiting the local Krishi Bhavan."
        );
        let user = format!("Context: {context}\n\nQuestion: {question}\nAnswer:");

        Self {
            system,
            user,
            source_ids: passages.iter().map(|p| p.id.clone()).collect(),
        }
    }
}

/// Text produced by a model for a grounded prompt
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    pub text: String,
    pub confidence: Confidence,
}

/// Port for language model providers
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AnswerPort: Send + Sync {
    async fn answer(&self, prompt: &GroundedPrompt) -> Result<GeneratedAnswer, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passages() -> Vec<Passage> {
        vec![
            Passage::new("banana_leaf_spot", "Leaf spot is fungal."),
            Passage::new("pesticide_rotation", "Rotate pesticides."),
        ]
    }

    #[test]
    fn context_joins_passages_in_order() {
        let prompt = GroundedPrompt::build("why spots?", &passages(), "English");
        assert!(
            prompt
                .user
                .contains("Leaf spot is fungal.\n---\nRotate pesticides.")
        );
        assert!(prompt.user.ends_with("Question: why spots?\nAnswer:"));
        assert_eq!(prompt.source_ids, vec!["banana_leaf_spot", "pesticide_rotation"]);
    }

    #[test]
    fn system_prompt_names_audience_and_language() {
        let prompt = GroundedPrompt::build("q", &[], "English");
        assert!(prompt.system.starts_with("You are an agricultural assistant for Kerala farmers."));
        assert!(prompt.system.contains("reply in English"));
        assert!(prompt.source_ids.is_empty());
    }
}
