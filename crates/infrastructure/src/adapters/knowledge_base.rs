//! Knowledge base - passages stored as text files in one directory

use std::path::{Path, PathBuf};

use application::error::ApplicationError;
use application::ports::{KnowledgeSource, Passage};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

const PASSAGE_EXTENSIONS: &[&str] = &["txt", "md"];

/// Each `.txt`/`.md` file is a passage; the file stem is its source id
#[derive(Debug, Clone)]
pub struct FileKnowledgeBase {
    dir: PathBuf,
}

impl FileKnowledgeBase {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn passage_id(path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if !PASSAGE_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }
        path.file_stem()?.to_str().map(ToString::to_string)
    }
}

#[async_trait]
impl KnowledgeSource for FileKnowledgeBase {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn passages(&self) -> Result<Vec<Passage>, ApplicationError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Corpus directory missing, corpus is empty");
                return Ok(Vec::new());
            },
            Err(e) => {
                return Err(ApplicationError::Internal(format!(
                    "cannot list corpus {}: {e}",
                    self.dir.display()
                )));
            },
        };

        let mut passages = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ApplicationError::Internal(format!("cannot list corpus: {e}")))?
        {
            let path = entry.path();
            let Some(id) = Self::passage_id(&path) else {
                continue;
            };
            match tokio::fs::read_to_string(&path).await {
                Ok(text) if !text.trim().is_empty() => {
                    passages.push(Passage::new(id, text.trim()));
                },
                Ok(_) => debug!(passage = %id, "Skipping empty passage"),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable passage"),
            }
        }

        passages.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(count = passages.len(), "Corpus loaded");
        Ok(passages)
    }
}
