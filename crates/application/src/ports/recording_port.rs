//! Recording ports - fetching the caller's audio and bringing it to the
//! canonical form the recognizers expect

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Audio held in memory
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Raw encoded bytes
    pub data: Vec<u8>,
    /// MIME type of `data`, e.g. `audio/wav`
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("size_bytes", &self.data.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Port for loading a recording from a URL or local path
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecordingFetcher: Send + Sync {
    /// Fetch the recording behind `reference`
    async fn fetch(&self, reference: &str) -> Result<AudioClip, ApplicationError>;
}

/// Port for converting audio to mono 16 kHz PCM WAV
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AudioNormalizer: Send + Sync {
    /// Convert `clip`; canonical input is returned unchanged
    async fn normalize(&self, clip: AudioClip) -> Result<AudioClip, ApplicationError>;
}
