//! Local speech recognition with the whisper.cpp CLI
//!
//! Runs `whisper-cli` against a temporary WAV file and reads the `.txt`
//! output next to it. With `--translate` the model emits English regardless
//! of the spoken language.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, instrument, warn};

use crate::config::WhisperCppConfig;
use crate::error::SpeechError;
use crate::ports::SpeechToText;
use crate::types::{AudioData, AudioFormat, TranscribeOptions, Transcription};

/// Local STT provider using whisper.cpp
#[derive(Debug, Clone)]
pub struct WhisperCppProvider {
    config: WhisperCppConfig,
}

impl WhisperCppProvider {
    /// Create a new whisper.cpp provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: WhisperCppConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;
        Ok(Self { config })
    }

    fn executable(&self) -> &Path {
        &self.config.executable_path
    }

    fn model(&self) -> &Path {
        &self.config.model_path
    }

    /// Build the CLI invocation for one file
    fn command(&self, audio_path: &Path, options: &TranscribeOptions) -> Command {
        let mut cmd = Command::new(self.executable());
        cmd.arg("-m")
            .arg(self.model())
            .arg("-f")
            .arg(audio_path)
            .arg("--output-txt")
            .arg("--no-timestamps")
            .arg("-t")
            .arg(self.config.threads.to_string())
            .arg("-l")
            .arg(options.language_hint.as_deref().unwrap_or("auto"));

        if options.translate_to_english {
            cmd.arg("--translate");
        }

        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    #[instrument(skip(self, audio_path, options), fields(model = %self.model().display()))]
    async fn run_whisper(
        &self,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> Result<String, SpeechError> {
        let output = self
            .command(audio_path, options)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpeechError::NotAvailable(format!(
                        "whisper.cpp not found at '{}'",
                        self.executable().display()
                    ))
                } else {
                    SpeechError::TranscriptionFailed(format!("Failed to run whisper.cpp: {e}"))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(status = %output.status, "whisper.cpp failed");
            return Err(SpeechError::TranscriptionFailed(format!(
                "whisper.cpp exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        // whisper.cpp appends .txt to the full input name
        let mut txt_path = audio_path.as_os_str().to_owned();
        txt_path.push(".txt");
        let text = tokio::fs::read_to_string(&txt_path).await.map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to read transcription output: {e}"))
        })?;
        if let Err(e) = tokio::fs::remove_file(&txt_path).await {
            warn!(error = %e, "Failed to remove whisper.cpp output file");
        }

        Ok(text.trim().to_string())
    }

    /// Write audio to a temp WAV; the file is deleted when the handle drops
    async fn write_temp_audio(audio: &AudioData) -> Result<NamedTempFile, SpeechError> {
        let temp_file = NamedTempFile::with_suffix(".wav").map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to create temp file: {e}"))
        })?;

        let mut file = tokio::fs::File::create(temp_file.path()).await.map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to open temp file: {e}"))
        })?;
        file.write_all(audio.data()).await.map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to write audio data: {e}"))
        })?;
        file.flush().await.map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to flush temp file: {e}"))
        })?;

        Ok(temp_file)
    }
}

#[async_trait]
impl SpeechToText for WhisperCppProvider {
    #[instrument(skip(self, audio, options), fields(
        format = %audio.format(),
        translate = options.translate_to_english
    ))]
    async fn transcribe(
        &self,
        audio: &AudioData,
        options: &TranscribeOptions,
    ) -> Result<Transcription, SpeechError> {
        if audio.format() != AudioFormat::Wav {
            return Err(SpeechError::InvalidAudio(format!(
                "whisper.cpp expects WAV input, got {}",
                audio.format()
            )));
        }
        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }

        let temp_file = Self::write_temp_audio(audio).await?;
        let text = self.run_whisper(temp_file.path(), options).await?;
        drop(temp_file);

        if text.is_empty() {
            warn!("whisper.cpp returned empty transcription");
        }
        debug!(text_len = text.len(), "whisper.cpp transcription complete");

        let mut transcription = Transcription::new(text);
        if let Some(lang) = &options.language_hint {
            transcription = transcription.with_language(lang.clone());
        }
        Ok(transcription)
    }

    async fn is_available(&self) -> bool {
        let executable_exists = self.executable().exists()
            || Command::new(self.executable())
                .arg("--help")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .is_ok_and(|s| s.success());

        let model_exists = self.model().exists();
        debug!(executable_exists, model_exists, "whisper.cpp availability");
        executable_exists && model_exists
    }

    fn provider_name(&self) -> &'static str {
        "whisper_cpp"
    }

    fn model_name(&self) -> &str {
        self.model()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("whisper.cpp")
    }
}
