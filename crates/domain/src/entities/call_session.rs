//! Call session entity and its status state machine

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::DomainError,
    value_objects::{CallerId, LanguageTag},
};

/// Processing status of an inbound call.
///
/// Statuses only move forward. `Failed` can be entered from any non-terminal
/// status, `Completed` only after notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// Webhook accepted, nothing processed yet
    Received,
    /// Fetching and recognizing the recording
    Transcribing,
    /// Querying the knowledge base and language model
    Answering,
    /// Translating the answer into the caller's language
    Translating,
    /// Producing the spoken answer
    Synthesizing,
    /// Delivering text and voice to the caller
    Notifying,
    /// Answer delivered
    Completed,
    /// A fallback message was delivered instead of an answer
    Failed,
}

impl CallStatus {
    /// Position in the forward order
    const fn rank(self) -> u8 {
        match self {
            Self::Received => 0,
            Self::Transcribing => 1,
            Self::Answering => 2,
            Self::Translating => 3,
            Self::Synthesizing => 4,
            Self::Notifying => 5,
            Self::Completed | Self::Failed => 6,
        }
    }

    /// Check if the status is final
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check whether moving from `self` to `next` is allowed
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            Self::Failed => true,
            Self::Completed => matches!(self, Self::Notifying),
            _ => next.rank() > self.rank(),
        }
    }

    /// Stable lowercase label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Transcribing => "transcribing",
            Self::Answering => "answering",
            Self::Translating => "translating",
            Self::Synthesizing => "synthesizing",
            Self::Notifying => "notifying",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One inbound call, owned by the pipeline while it is processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    /// Internal identifier
    pub id: Uuid,
    /// Telephony provider call id, if supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_sid: Option<String>,
    /// Who called
    pub caller: CallerId,
    /// Where the recording lives (URL or local path)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording: Option<String>,
    /// Language the caller speaks and should be answered in
    pub source_language: LanguageTag,
    status: CallStatus,
    history: Vec<(CallStatus, DateTime<Utc>)>,
    /// Why the call ended in `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// When the webhook arrived
    pub received_at: DateTime<Utc>,
}

impl CallSession {
    /// Create a session in `Received`. Blank recording references count as absent.
    pub fn new(
        caller: CallerId,
        recording: Option<String>,
        source_language: LanguageTag,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            call_sid: None,
            caller,
            recording: recording
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            source_language,
            status: CallStatus::Received,
            history: vec![(CallStatus::Received, now)],
            failure_reason: None,
            received_at: now,
        }
    }

    /// Attach the provider's call id
    #[must_use]
    pub fn with_call_sid(mut self, sid: impl Into<String>) -> Self {
        self.call_sid = Some(sid.into());
        self
    }

    /// Current status
    pub const fn status(&self) -> CallStatus {
        self.status
    }

    /// Every status the session has been in, oldest first
    pub fn history(&self) -> impl Iterator<Item = CallStatus> + '_ {
        self.history.iter().map(|(s, _)| *s)
    }

    /// Whether a recording reference is present
    pub const fn has_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Move forward to `next`
    pub fn advance(&mut self, next: CallStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.history.push((next, Utc::now()));
        Ok(())
    }

    /// Finish successfully; only valid from `Notifying`
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.advance(CallStatus::Completed)
    }

    /// Finish in `Failed` with a reason
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        self.advance(CallStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }
}
