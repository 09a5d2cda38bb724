//! Filesystem artifact store for synthesized audio

use std::io::Write;
use std::path::{Path, PathBuf};

use application::error::ApplicationError;
use application::ports::{ArtifactStore, PlayableRef, is_safe_artifact_name};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Writes artifacts into one directory served under `public_base_url`
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
    public_base_url: String,
}

impl FsArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{name}", self.public_base_url.trim_end_matches('/'))
    }
}

fn write_atomically(dir: &Path, target: &Path, data: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    #[instrument(skip(self, data), fields(size_bytes = data.len()))]
    async fn save(&self, name: &str, data: &[u8]) -> Result<PlayableRef, ApplicationError> {
        if !is_safe_artifact_name(name) {
            return Err(ApplicationError::InvalidInput(format!(
                "unsafe artifact name '{name}'"
            )));
        }

        let dir = self.dir.clone();
        let path = self.dir.join(name);
        let target = path.clone();
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &data))
            .await
            .map_err(|e| ApplicationError::Internal(format!("artifact writer panicked: {e}")))?
            .map_err(|e| {
                ApplicationError::Internal(format!("cannot write {}: {e}", path.display()))
            })?;

        debug!(path = %path.display(), "Artifact stored");
        Ok(PlayableRef {
            url: self.url_for(name),
            path,
        })
    }

    #[instrument(skip(self))]
    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, ApplicationError> {
        if !is_safe_artifact_name(name) {
            return Ok(None);
        }
        match tokio::fs::read(self.dir.join(name)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApplicationError::Internal(format!(
                "cannot read artifact {name}: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> FsArtifactStore {
        FsArtifactStore::new(dir.join("tts"), "http://localhost:8000/static/tts/")
    }

    #[tokio::test]
    async fn save_creates_directory_and_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let playable = store.save("tts_91999.mp3", b"mp3").await.unwrap();

        assert_eq!(playable.url, "http://localhost:8000/static/tts/tts_91999.mp3");
        assert_eq!(playable.path, dir.path().join("tts").join("tts_91999.mp3"));
        assert_eq!(std::fs::read(&playable.path).unwrap(), b"mp3");
    }

    #[tokio::test]
    async fn repeat_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store.save("tts_91999.mp3", b"first").await.unwrap();
        store.save("tts_91999.mp3", b"second").await.unwrap();

        assert_eq!(
            store.load("tts_91999.mp3").await.unwrap().as_deref(),
            Some(&b"second"[..])
        );
        // only the artifact remains, no temp files
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn unsafe_names_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        assert!(store.save("../escape.mp3", b"x").await.is_err());
        assert_eq!(store.load("../escape.mp3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_artifact_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store(dir.path()).load("tts_1.mp3").await.unwrap(), None);
    }
}
