//! Translation port - text between two languages

use async_trait::async_trait;
use domain::LanguagePair;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of asking one translator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Translated(String),
    /// The translator has no resource for this pair
    Unsupported,
}

/// Port for translation providers
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TranslationPort: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        pair: &LanguagePair,
    ) -> Result<TranslationOutcome, ApplicationError>;

    /// Release cached per-pair resources
    fn shutdown(&self);
}
