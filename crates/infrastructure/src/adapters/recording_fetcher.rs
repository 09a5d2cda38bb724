//! Recording fetcher - downloads call recordings or reads them from disk

use std::path::{Path, PathBuf};
use std::time::Duration;

use ai_speech::AudioFormat;
use application::error::ApplicationError;
use application::ports::{AudioClip, RecordingFetcher};
use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{debug, instrument};

/// Fetches `http(s)://` URLs, and `file://` URLs or bare paths under an
/// allowed local directory
#[derive(Debug, Clone)]
pub struct HttpRecordingFetcher {
    client: Client,
    max_bytes: usize,
    local_root: Option<PathBuf>,
}

impl HttpRecordingFetcher {
    /// Create a fetcher rejecting recordings above `max_bytes`
    ///
    /// Local references are refused until [`Self::with_local_root`] is set.
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, ApplicationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApplicationError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            max_bytes,
            local_root: None,
        })
    }

    /// Allow local recordings that resolve inside `root`
    #[must_use]
    pub fn with_local_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.local_root = Some(root.into());
        self
    }

    /// Resolve `path` and check it stays inside the allowed directory
    async fn resolve_local(&self, path: &Path) -> Result<PathBuf, ApplicationError> {
        let Some(root) = &self.local_root else {
            return Err(ApplicationError::AudioAcquisition(
                "local recording references are disabled".to_string(),
            ));
        };
        let unreadable = |e: std::io::Error| {
            ApplicationError::AudioAcquisition(format!("cannot read {}: {e}", path.display()))
        };
        let root = tokio::fs::canonicalize(root).await.map_err(|e| {
            ApplicationError::AudioAcquisition(format!(
                "recordings directory {}: {e}",
                root.display()
            ))
        })?;
        let candidate = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        let resolved = tokio::fs::canonicalize(&candidate).await.map_err(unreadable)?;
        if !resolved.starts_with(&root) {
            return Err(ApplicationError::AudioAcquisition(format!(
                "{} is outside the recordings directory",
                path.display()
            )));
        }
        Ok(resolved)
    }

    fn too_large(&self, size: usize) -> ApplicationError {
        ApplicationError::AudioAcquisition(format!(
            "recording of {size} bytes exceeds limit of {} bytes",
            self.max_bytes
        ))
    }

    async fn fetch_http(&self, url: &str) -> Result<AudioClip, ApplicationError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApplicationError::AudioAcquisition(format!("download failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApplicationError::AudioAcquisition(format!(
                "download returned HTTP {status}"
            )));
        }
        if let Some(length) = response.content_length() {
            let length = usize::try_from(length).unwrap_or(usize::MAX);
            if length > self.max_bytes {
                return Err(self.too_large(length));
            }
        }

        let format = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(AudioFormat::from_mime_type)
            .or_else(|| AudioFormat::from_path(url))
            .unwrap_or(AudioFormat::Wav);

        // servers may omit or misstate the length, so count while reading
        let mut data = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ApplicationError::AudioAcquisition(format!("download failed: {e}")))?
        {
            if data.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large(data.len() + chunk.len()));
            }
            data.extend_from_slice(&chunk);
        }

        Ok(AudioClip::new(data, format.mime_type()))
    }

    async fn fetch_file(&self, path: &Path) -> Result<AudioClip, ApplicationError> {
        let path = self.resolve_local(path).await?;
        let path = path.as_path();
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            ApplicationError::AudioAcquisition(format!("cannot read {}: {e}", path.display()))
        })?;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > self.max_bytes {
            return Err(self.too_large(size));
        }

        let data = tokio::fs::read(path).await.map_err(|e| {
            ApplicationError::AudioAcquisition(format!("cannot read {}: {e}", path.display()))
        })?;
        let format = path
            .to_str()
            .and_then(AudioFormat::from_path)
            .unwrap_or(AudioFormat::Wav);
        Ok(AudioClip::new(data, format.mime_type()))
    }
}

#[async_trait]
impl RecordingFetcher for HttpRecordingFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, reference: &str) -> Result<AudioClip, ApplicationError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ApplicationError::AudioAcquisition(
                "empty recording reference".to_string(),
            ));
        }

        let clip = if reference.starts_with("http://") || reference.starts_with("https://") {
            self.fetch_http(reference).await?
        } else {
            let path = reference.strip_prefix("file://").unwrap_or(reference);
            self.fetch_file(Path::new(path)).await?
        };

        if clip.is_empty() {
            return Err(ApplicationError::AudioAcquisition(
                "recording is empty".to_string(),
            ));
        }
        debug!(size_bytes = clip.len(), mime_type = %clip.mime_type, "Recording fetched");
        Ok(clip)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn fetcher(max_bytes: usize, root: &Path) -> HttpRecordingFetcher {
        HttpRecordingFetcher::new(Duration::from_secs(5), max_bytes)
            .unwrap()
            .with_local_root(root)
    }

    #[tokio::test]
    async fn reads_local_path_and_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = tempfile::Builder::new()
            .suffix(".mp3")
            .tempfile_in(dir.path())
            .unwrap();
        file.write_all(b"ID3fake").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let clip = fetcher(1024, dir.path()).fetch(&path).await.unwrap();
        assert_eq!(clip.data, b"ID3fake");
        assert_eq!(clip.mime_type, "audio/mpeg");

        let clip = fetcher(1024, dir.path())
            .fetch(&format!("file://{path}"))
            .await
            .unwrap();
        assert_eq!(clip.len(), 7);
    }

    #[tokio::test]
    async fn relative_paths_resolve_under_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("call.ogg"), b"OggS").unwrap();

        let clip = fetcher(1024, dir.path()).fetch("call.ogg").await.unwrap();
        assert_eq!(clip.mime_type, "audio/ogg");
    }

    #[tokio::test]
    async fn unknown_extension_defaults_to_wav() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
        file.write_all(b"RIFF").unwrap();
        let clip = fetcher(1024, dir.path())
            .fetch(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(clip.mime_type, "audio/wav");
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        let err = fetcher(16, dir.path())
            .fetch(file.path().to_str().unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exceeds limit"));
    }

    #[tokio::test]
    async fn missing_and_empty_references_fail() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            fetcher(16, dir.path()).fetch("not-here.wav").await,
            Err(ApplicationError::AudioAcquisition(_))
        ));
        assert!(matches!(
            fetcher(16, dir.path()).fetch("  ").await,
            Err(ApplicationError::AudioAcquisition(_))
        ));
    }

    #[tokio::test]
    async fn empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
        assert!(
            fetcher(16, dir.path())
                .fetch(file.path().to_str().unwrap())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn local_references_refused_without_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("call.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let fetcher = HttpRecordingFetcher::new(Duration::from_secs(5), 1024).unwrap();
        let err = fetcher.fetch(path.to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("disabled"));
        assert!(
            fetcher
                .fetch(&format!("file://{}", path.display()))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn paths_outside_root_are_refused() {
        let root = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let secret = elsewhere.path().join("secret.wav");
        std::fs::write(&secret, b"RIFF").unwrap();

        let fetcher = fetcher(1024, root.path());
        let err = fetcher.fetch(secret.to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("outside the recordings directory"));

        std::fs::create_dir(root.path().join("calls")).unwrap();
        let escape = format!(
            "calls/../../{}/secret.wav",
            elsewhere.path().file_name().unwrap().to_str().unwrap()
        );
        assert!(fetcher.fetch(&escape).await.is_err());
    }
}
