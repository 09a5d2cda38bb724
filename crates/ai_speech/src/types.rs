//! Audio and transcription types shared by all providers

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Sample rate of canonical recognition audio
pub const CANONICAL_SAMPLE_RATE: u32 = 16_000;

/// Channel count of canonical recognition audio
pub const CANONICAL_CHANNELS: u16 = 1;

/// Supported audio container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
    Ogg,
    Opus,
    Flac,
    Webm,
    M4a,
}

impl AudioFormat {
    /// MIME type for this format
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Ogg => "audio/ogg",
            Self::Opus => "audio/opus",
            Self::Flac => "audio/flac",
            Self::Webm => "audio/webm",
            Self::M4a => "audio/mp4",
        }
    }

    /// File extension without the dot
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Opus => "opus",
            Self::Flac => "flac",
            Self::Webm => "webm",
            Self::M4a => "m4a",
        }
    }

    /// Parse a `Content-Type` header value, ignoring parameters
    #[must_use]
    pub fn from_mime_type(content_type: &str) -> Option<Self> {
        let parsed: mime::Mime = content_type.trim().parse().ok()?;
        if parsed.type_() != mime::AUDIO {
            return None;
        }
        match parsed.subtype().as_str() {
            "wav" | "x-wav" | "wave" | "vnd.wave" => Some(Self::Wav),
            "mpeg" | "mp3" | "mpeg3" | "x-mpeg-3" => Some(Self::Mp3),
            "ogg" => Some(Self::Ogg),
            "opus" => Some(Self::Opus),
            "flac" | "x-flac" => Some(Self::Flac),
            "webm" => Some(Self::Webm),
            "mp4" | "m4a" | "x-m4a" => Some(Self::M4a),
            _ => None,
        }
    }

    /// Guess the format from a file name or URL path
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "wav" | "wave" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "ogg" | "oga" => Some(Self::Ogg),
            "opus" => Some(Self::Opus),
            "flac" => Some(Self::Flac),
            "webm" => Some(Self::Webm),
            "m4a" | "mp4" => Some(Self::M4a),
            _ => None,
        }
    }

    /// Formats accepted by the OpenAI Whisper endpoints without conversion
    #[must_use]
    pub const fn is_whisper_supported(&self) -> bool {
        matches!(
            self,
            Self::Wav | Self::Mp3 | Self::Ogg | Self::Flac | Self::Webm | Self::M4a
        )
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Channel count and sample rate read from a RIFF/WAVE header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavSpec {
    /// Parse the `fmt ` chunk of a WAV file, walking chunks after the RIFF header
    #[must_use]
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
            return None;
        }

        let mut offset = 12;
        while offset + 8 <= data.len() {
            let id = &data[offset..offset + 4];
            let size = u32::from_le_bytes(data[offset + 4..offset + 8].try_into().ok()?) as usize;
            let body = offset + 8;

            if id == b"fmt " {
                let chunk = data.get(body..body + 16)?;
                return Some(Self {
                    channels: u16::from_le_bytes([chunk[2], chunk[3]]),
                    sample_rate: u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]),
                    bits_per_sample: u16::from_le_bytes([chunk[14], chunk[15]]),
                });
            }

            // chunks are word aligned
            offset = body.checked_add(size)?.checked_add(size % 2)?;
        }
        None
    }

    /// Mono, 16 kHz, 16-bit PCM
    #[must_use]
    pub const fn is_canonical(&self) -> bool {
        self.channels == CANONICAL_CHANNELS
            && self.sample_rate == CANONICAL_SAMPLE_RATE
            && self.bits_per_sample == 16
    }
}

/// Audio bytes tagged with their container format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    data: Bytes,
    format: AudioFormat,
}

impl AudioData {
    /// Wrap raw bytes
    #[must_use]
    pub fn new(data: impl Into<Bytes>, format: AudioFormat) -> Self {
        Self {
            data: data.into(),
            format,
        }
    }

    /// Raw bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume into the underlying buffer
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Container format
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// Payload size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// MIME type of the container
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// File name with the right extension for multipart uploads
    #[must_use]
    pub fn filename(&self, base: &str) -> String {
        format!("{base}.{}", self.format.extension())
    }

    /// Whether this is already mono 16 kHz 16-bit WAV
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.format == AudioFormat::Wav && WavSpec::parse(&self.data).is_some_and(|s| s.is_canonical())
    }
}

/// Result of speech recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// Recognized text
    pub text: String,
    /// Language detected in the audio, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Provider confidence in `[0, 1]`, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Audio duration in milliseconds, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl Transcription {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            confidence: None,
            duration_ms: None,
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub const fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[must_use]
    pub const fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// No speech was recognized
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Options for a recognition request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscribeOptions {
    /// Translate recognized speech into English instead of transcribing verbatim
    pub translate_to_english: bool,
    /// Spoken language hint (ISO 639-1), auto-detected when absent
    pub language_hint: Option<String>,
}

impl TranscribeOptions {
    /// Recognize-and-translate into English with optional source hint
    #[must_use]
    pub fn translate(language_hint: Option<String>) -> Self {
        Self {
            translate_to_english: true,
            language_hint,
        }
    }
}
