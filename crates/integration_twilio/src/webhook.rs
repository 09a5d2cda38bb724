//! Inbound call webhook payload
//!
//! Twilio posts form fields in PascalCase; other callers of the endpoint use
//! snake_case. Both spellings are accepted.

use serde::Deserialize;

/// Fields of a completed-recording call webhook
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallWebhookForm {
    #[serde(rename = "From", alias = "from", default)]
    pub from: Option<String>,

    #[serde(rename = "RecordingUrl", alias = "recording_url", default)]
    pub recording_url: Option<String>,

    #[serde(rename = "CallSid", alias = "call_sid", default)]
    pub call_sid: Option<String>,

    /// Caller language hint, e.g. `ml`
    #[serde(alias = "Language", default)]
    pub language: Option<String>,
}

impl CallWebhookForm {
    /// Caller identifier, or `unknown` when absent or blank
    pub fn caller(&self) -> &str {
        non_blank(self.from.as_deref()).unwrap_or("unknown")
    }

    /// Recording URL when present and non-blank
    pub fn recording(&self) -> Option<&str> {
        non_blank(self.recording_url.as_deref())
    }

    pub fn call_sid(&self) -> Option<&str> {
        non_blank(self.call_sid.as_deref())
    }

    pub fn language(&self) -> Option<&str> {
        non_blank(self.language.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
