//! Audio normalization for speech recognition
//!
//! Recordings arrive as MP3 or WAV at whatever rate the telephony provider
//! chose. Recognition providers get mono 16 kHz 16-bit PCM WAV.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::SpeechError;
use crate::types::{AudioData, AudioFormat, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE};

/// FFmpeg-backed converter to canonical recognition audio
#[derive(Debug, Clone, Default)]
pub struct AudioConverter {
    /// FFmpeg binary path (defaults to "ffmpeg" in PATH)
    ffmpeg_path: Option<String>,
}

impl AudioConverter {
    /// Create a converter using `ffmpeg` from PATH
    #[must_use]
    pub const fn new() -> Self {
        Self { ffmpeg_path: None }
    }

    /// Create a converter with a custom FFmpeg path
    #[must_use]
    pub fn with_ffmpeg_path(path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: Some(path.into()),
        }
    }

    fn ffmpeg_path(&self) -> &str {
        self.ffmpeg_path.as_deref().unwrap_or("ffmpeg")
    }

    /// Check if FFmpeg can be executed
    #[instrument(skip(self))]
    pub async fn is_available(&self) -> bool {
        Command::new(self.ffmpeg_path())
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|status| status.success())
    }

    /// Convert to mono 16 kHz PCM WAV.
    ///
    /// Audio that already has that layout is returned without spawning FFmpeg.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::InvalidAudio` for empty input and
    /// `SpeechError::AudioProcessing` if FFmpeg is missing or fails.
    #[instrument(skip(self, audio), fields(input_format = %audio.format(), size = audio.size_bytes()))]
    pub async fn to_canonical(&self, audio: &AudioData) -> Result<AudioData, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }
        if audio.is_canonical() {
            debug!("Audio already canonical, skipping conversion");
            return Ok(audio.clone());
        }

        let mut cmd = Command::new(self.ffmpeg_path());
        cmd.args(["-hide_banner", "-loglevel", "error", "-i", "pipe:0"])
            .args(["-ac", &CANONICAL_CHANNELS.to_string()])
            .args(["-ar", &CANONICAL_SAMPLE_RATE.to_string()])
            .args(["-codec:a", "pcm_s16le", "-f", "wav", "pipe:1"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| SpeechError::AudioProcessing(format!("Failed to spawn FFmpeg: {e}")))?;

        let stdin = child.stdin.take();
        let input = audio.data().to_vec();

        // Feed stdin while draining stdout so large inputs cannot fill both pipes.
        let writer = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (written, output) = tokio::join!(writer, child.wait_with_output());

        let output = output
            .map_err(|e| SpeechError::AudioProcessing(format!("Failed to wait for FFmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::AudioProcessing(format!(
                "FFmpeg conversion failed: {}",
                stderr.trim()
            )));
        }
        written.map_err(|e| {
            SpeechError::AudioProcessing(format!("Failed to write to FFmpeg stdin: {e}"))
        })?;

        if output.stdout.is_empty() {
            return Err(SpeechError::AudioProcessing(
                "FFmpeg produced empty output".to_string(),
            ));
        }

        debug!(output_size = output.stdout.len(), "Conversion successful");
        Ok(AudioData::new(output.stdout, AudioFormat::Wav))
    }
}
