//! Artifact store - synthesized audio files and the URLs they are served at

use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Where a stored artifact lives and how a phone can reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableRef {
    pub path: PathBuf,
    pub url: String,
}

/// Whether `name` is a plain file name that stays inside the store
pub fn is_safe_artifact_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && !name.starts_with('.')
        && !name.chars().any(char::is_control)
}

/// Port for storing and serving audio artifacts
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write `data` under `name`, replacing any previous artifact atomically
    async fn save(&self, name: &str, data: &[u8]) -> Result<PlayableRef, ApplicationError>;

    /// Read an artifact back; `None` when it does not exist
    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, ApplicationError>;
}
