//! Delivery of the answer over text and voice

use std::sync::Arc;

use domain::CallerId;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{DeliveryMode, DeliveryReceipt, PlayableRef, TextMessagingPort, VoiceMessagingPort};

/// What happened on one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChannelOutcome {
    Sent {
        mode: DeliveryMode,
        delivered: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        reference: Option<String>,
    },
    Failed {
        error: String,
    },
    Skipped {
        reason: &'static str,
    },
}

impl ChannelOutcome {
    fn from_result(result: Result<DeliveryReceipt, ApplicationError>) -> Self {
        match result {
            Ok(receipt) => Self::Sent {
                mode: receipt.mode,
                delivered: receipt.delivered,
                reference: receipt.reference,
            },
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of both channels for one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationReport {
    pub text: ChannelOutcome,
    pub voice: ChannelOutcome,
}

/// Sends the SMS and the playback call independently
pub struct NotificationStage {
    text: Arc<dyn TextMessagingPort>,
    voice: Arc<dyn VoiceMessagingPort>,
}

impl std::fmt::Debug for NotificationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationStage")
            .field("text_mode", &self.text.mode())
            .field("voice_mode", &self.voice.mode())
            .finish()
    }
}

impl NotificationStage {
    pub fn new(text: Arc<dyn TextMessagingPort>, voice: Arc<dyn VoiceMessagingPort>) -> Self {
        Self { text, voice }
    }

    /// Deliver `body` by text and, when audio exists, play it in a call
    ///
    /// A failure on one channel never prevents the other.
    #[instrument(skip(self, body, playable), fields(caller = %caller, has_audio = playable.is_some()))]
    pub async fn notify(
        &self,
        caller: &CallerId,
        body: &str,
        playable: Option<&PlayableRef>,
    ) -> NotificationReport {
        if !caller.is_dialable() {
            warn!("Caller id is not a phone number, nothing to notify");
            return NotificationReport {
                text: ChannelOutcome::Skipped {
                    reason: "caller not dialable",
                },
                voice: ChannelOutcome::Skipped {
                    reason: "caller not dialable",
                },
            };
        }

        let text = async { ChannelOutcome::from_result(self.text.send_text(caller, body).await) };
        let voice = async {
            match playable {
                Some(p) => ChannelOutcome::from_result(self.voice.play_audio(caller, &p.url).await),
                None => ChannelOutcome::Skipped {
                    reason: "no playable audio",
                },
            }
        };
        let (text, voice) = tokio::join!(text, voice);

        if let ChannelOutcome::Failed { error } = &text {
            warn!(channel = "text", %error, "Notification failed");
        }
        if let ChannelOutcome::Failed { error } = &voice {
            warn!(channel = "voice", %error, "Notification failed");
        }
        info!(?text, ?voice, "Notification finished");

        NotificationReport { text, voice }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::ports::{MockTextMessagingPort, MockVoiceMessagingPort};

    fn caller() -> CallerId {
        CallerId::new("+91999").unwrap()
    }

    fn playable() -> PlayableRef {
        PlayableRef {
            path: PathBuf::from("/tmp/tts/tts_91999.mp3"),
            url: "http://localhost:8000/static/tts/tts_91999.mp3".to_string(),
        }
    }

    fn stage(text: MockTextMessagingPort, voice: MockVoiceMessagingPort) -> NotificationStage {
        NotificationStage::new(Arc::new(text), Arc::new(voice))
    }

    #[tokio::test]
    async fn both_channels_are_used() {
        let mut text = MockTextMessagingPort::new();
        text.expect_send_text()
            .withf(|to, body| to.as_str() == "+91999" && body == "hello")
            .times(1)
            .returning(|_, _| Ok(DeliveryReceipt::live("SM1")));
        let mut voice = MockVoiceMessagingPort::new();
        voice
            .expect_play_audio()
            .withf(|_, url| url.ends_with("tts_91999.mp3"))
            .times(1)
            .returning(|_, _| Ok(DeliveryReceipt::live("CA1")));

        let report = stage(text, voice).notify(&caller(), "hello", Some(&playable())).await;

        assert_eq!(
            report.text,
            ChannelOutcome::Sent {
                mode: DeliveryMode::Live,
                delivered: true,
                reference: Some("SM1".to_string())
            }
        );
        assert!(matches!(report.voice, ChannelOutcome::Sent { delivered: true, .. }));
    }

    #[tokio::test]
    async fn text_failure_does_not_block_voice() {
        let mut text = MockTextMessagingPort::new();
        text.expect_send_text()
            .returning(|_, _| Err(ApplicationError::Notification("401".to_string())));
        let mut voice = MockVoiceMessagingPort::new();
        voice
            .expect_play_audio()
            .times(1)
            .returning(|_, _| Ok(DeliveryReceipt::stub()));

        let report = stage(text, voice).notify(&caller(), "hello", Some(&playable())).await;

        assert!(report.text.is_failed());
        assert!(matches!(
            report.voice,
            ChannelOutcome::Sent {
                mode: DeliveryMode::Stub,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn voice_is_skipped_without_audio() {
        let mut text = MockTextMessagingPort::new();
        text.expect_send_text()
            .returning(|_, _| Ok(DeliveryReceipt::stub()));
        let mut voice = MockVoiceMessagingPort::new();
        voice.expect_play_audio().never();

        let report = stage(text, voice).notify(&caller(), "hello", None).await;
        assert_eq!(
            report.voice,
            ChannelOutcome::Skipped {
                reason: "no playable audio"
            }
        );
    }

    #[tokio::test]
    async fn unknown_caller_is_not_contacted() {
        let mut text = MockTextMessagingPort::new();
        text.expect_send_text().never();
        let mut voice = MockVoiceMessagingPort::new();
        voice.expect_play_audio().never();

        let report = stage(text, voice)
            .notify(&CallerId::unknown(), "hello", Some(&playable()))
            .await;
        assert!(matches!(report.text, ChannelOutcome::Skipped { .. }));
    }
}
