//! Caller identifier as delivered by the telephony provider

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Maximum stored length of a caller identifier
pub const MAX_CALLER_ID_LEN: usize = 64;

/// Identifies who placed a call or asked a question.
///
/// Usually an E.164-like phone number (`+91999...`), but webhooks without a
/// `From` field produce `unknown` and the text API uses `api-user`, so the
/// value is not restricted to dialable numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallerId {
    value: String,
}

impl CallerId {
    /// Identifier used when the webhook carries no caller
    pub const UNKNOWN: &'static str = "unknown";

    /// Identifier used for questions asked through the text API
    pub const API_USER: &'static str = "api-user";

    /// Create a caller id, normalizing phone-number punctuation.
    ///
    /// Spaces, dashes and parentheses are stripped. Empty values, control
    /// characters and values longer than [`MAX_CALLER_ID_LEN`] are rejected.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().replace([' ', '-', '(', ')'], "");

        if value.is_empty() {
            return Err(DomainError::InvalidCallerId(
                "caller id must not be empty".to_string(),
            ));
        }
        if value.chars().count() > MAX_CALLER_ID_LEN {
            return Err(DomainError::InvalidCallerId(format!(
                "caller id exceeds {MAX_CALLER_ID_LEN} characters"
            )));
        }
        if value.chars().any(char::is_control) {
            return Err(DomainError::InvalidCallerId(
                "caller id contains control characters".to_string(),
            ));
        }

        Ok(Self { value })
    }

    /// Caller id for a webhook without a `From` field
    pub fn unknown() -> Self {
        Self {
            value: Self::UNKNOWN.to_string(),
        }
    }

    /// Caller id for the text question API
    pub fn api_user() -> Self {
        Self {
            value: Self::API_USER.to_string(),
        }
    }

    /// Get the caller id as a string slice
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the id looks like a phone number a message can be sent to
    pub fn is_dialable(&self) -> bool {
        self.value
            .strip_prefix('+')
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
    }

    /// File-system safe stem derived only from the id.
    ///
    /// `+91999` becomes `91999`; characters outside `[A-Za-z0-9_-]` are dropped.
    pub fn artifact_stem(&self) -> String {
        let stem: String = self
            .value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        if stem.is_empty() {
            Self::UNKNOWN.to_string()
        } else {
            stem
        }
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<String> for CallerId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CallerId {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CallerId> for String {
    fn from(id: CallerId) -> Self {
        id.value
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn artifact_stem_is_path_safe(raw in "[ -~]{1,40}") {
            if let Ok(id) = CallerId::new(raw) {
                let stem = id.artifact_stem();
                prop_assert!(!stem.is_empty());
                prop_assert!(stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
            }
        }

        #[test]
        fn artifact_stem_is_deterministic(digits in "[0-9]{1,15}") {
            let a = CallerId::new(format!("+{digits}")).unwrap();
            let b = CallerId::new(format!("+{digits}")).unwrap();
            prop_assert_eq!(a.artifact_stem(), b.artifact_stem());
            prop_assert_eq!(a.artifact_stem(), digits);
        }
    }
}
