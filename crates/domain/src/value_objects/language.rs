//! Language tags and translation pairs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A BCP-47 style language tag restricted to `lang` or `lang-REGION`.
///
/// The primary subtag is stored lowercase, the region uppercase
/// (`ml`, `en`, `ml-IN`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageTag {
    value: String,
}

impl LanguageTag {
    /// Parse and normalize a language tag
    pub fn new(tag: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = tag.as_ref().trim().replace('_', "-");
        let mut parts = raw.split('-');

        let primary = parts.next().unwrap_or_default();
        if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidLanguageTag(raw));
        }

        let region = parts.next();
        if parts.next().is_some() {
            return Err(DomainError::InvalidLanguageTag(raw));
        }

        let value = match region {
            None => primary.to_ascii_lowercase(),
            Some(r) if r.len() == 2 && r.chars().all(|c| c.is_ascii_alphabetic()) => {
                format!("{}-{}", primary.to_ascii_lowercase(), r.to_ascii_uppercase())
            },
            Some(_) => return Err(DomainError::InvalidLanguageTag(raw)),
        };

        Ok(Self { value })
    }

    /// English, the pipeline's working language by default
    pub fn english() -> Self {
        Self {
            value: "en".to_string(),
        }
    }

    /// Malayalam, the default caller language
    pub fn malayalam() -> Self {
        Self {
            value: "ml".to_string(),
        }
    }

    /// Full normalized tag
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Primary language subtag (`ml` for `ml-IN`)
    pub fn primary(&self) -> &str {
        self.value.split('-').next().unwrap_or(&self.value)
    }

    /// Whether two tags name the same language, ignoring region
    pub fn same_language(&self, other: &Self) -> bool {
        self.primary() == other.primary()
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for LanguageTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LanguageTag {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageTag> for String {
    fn from(tag: LanguageTag) -> Self {
        tag.value
    }
}

/// Ordered (source, target) pair used to key translation resources
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: LanguageTag,
    pub target: LanguageTag,
}

impl LanguagePair {
    /// Create a new pair
    pub const fn new(source: LanguageTag, target: LanguageTag) -> Self {
        Self { source, target }
    }

    /// Source and target are the same language, so nothing needs translating
    pub fn is_identity(&self) -> bool {
        self.source.same_language(&self.target)
    }

    /// The same pair with primary subtags only (`en-US -> ml-IN` becomes `en -> ml`)
    pub fn primary(&self) -> (&str, &str) {
        (self.source.primary(), self.target.primary())
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_normalized() {
        assert_eq!(LanguageTag::new("ML").unwrap().as_str(), "ml");
        assert_eq!(LanguageTag::new("ml_in").unwrap().as_str(), "ml-IN");
        assert_eq!(LanguageTag::new(" en-us ").unwrap().as_str(), "en-US");
    }

    #[test]
    fn malformed_tags_are_rejected() {
        assert!(LanguageTag::new("").is_err());
        assert!(LanguageTag::new("m").is_err());
        assert!(LanguageTag::new("malayalam").is_err());
        assert!(LanguageTag::new("ml-IND").is_err());
        assert!(LanguageTag::new("ml-IN-x").is_err());
        assert!(LanguageTag::new("m1").is_err());
    }

    #[test]
    fn primary_subtag() {
        assert_eq!(LanguageTag::new("ml-IN").unwrap().primary(), "ml");
        assert_eq!(LanguageTag::english().primary(), "en");
    }

    #[test]
    fn identity_pair_ignores_region() {
        let pair = LanguagePair::new(
            LanguageTag::new("en-US").unwrap(),
            LanguageTag::english(),
        );
        assert!(pair.is_identity());

        let pair = LanguagePair::new(LanguageTag::english(), LanguageTag::malayalam());
        assert!(!pair.is_identity());
        assert_eq!(pair.to_string(), "en-ml");
    }

    #[test]
    fn pairs_are_ordered() {
        let en_ml = LanguagePair::new(LanguageTag::english(), LanguageTag::malayalam());
        let ml_en = LanguagePair::new(LanguageTag::malayalam(), LanguageTag::english());
        assert_ne!(en_ml, ml_en);
    }

    #[test]
    fn serde_roundtrip_normalizes() {
        let tag: LanguageTag = serde_json::from_str("\"ML-in\"").unwrap();
        assert_eq!(tag.as_str(), "ml-IN");
    }
}
