//! Knowledge port - the passage corpus answers are grounded on

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// One retrievable passage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    /// Stable source identifier cited in answers
    pub id: String,
    pub text: String,
}

impl Passage {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Port for reading the corpus
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Every passage in the corpus; may be empty
    async fn passages(&self) -> Result<Vec<Passage>, ApplicationError>;
}
