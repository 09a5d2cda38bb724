//! Audio acquisition: recording reference to canonical in-memory audio

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::ApplicationError;
use crate::ports::{AudioClip, AudioNormalizer, RecordingFetcher};

/// Fetches a recording and converts it to mono 16 kHz WAV
pub struct AudioAcquisitionStage {
    fetcher: Arc<dyn RecordingFetcher>,
    normalizer: Arc<dyn AudioNormalizer>,
}

impl std::fmt::Debug for AudioAcquisitionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioAcquisitionStage").finish_non_exhaustive()
    }
}

impl AudioAcquisitionStage {
    pub fn new(fetcher: Arc<dyn RecordingFetcher>, normalizer: Arc<dyn AudioNormalizer>) -> Self {
        Self {
            fetcher,
            normalizer,
        }
    }

    /// Fetch and normalize the recording behind `reference`
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::AudioAcquisition` for empty recordings and
    /// propagates fetch and conversion failures.
    #[instrument(skip(self))]
    pub async fn acquire(&self, reference: &str) -> Result<AudioClip, ApplicationError> {
        let clip = self.fetcher.fetch(reference).await?;
        if clip.is_empty() {
            return Err(ApplicationError::AudioAcquisition(
                "recording is empty".to_string(),
            ));
        }
        debug!(size_bytes = clip.len(), mime_type = %clip.mime_type, "Recording fetched");

        let canonical = self.normalizer.normalize(clip).await?;
        debug!(size_bytes = canonical.len(), "Recording normalized");
        Ok(canonical)
    }
}
