//! Localized messages the caller hears when the pipeline cannot answer

use domain::LanguageTag;
use serde::Serialize;

/// Why the pipeline fell back to a fixed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    /// The webhook carried no recording
    NoAudio,
    /// Speech recognition returned no text
    AudioUnclear,
    /// Every answering provider failed
    NoAnswer,
    /// Anything else went wrong
    Generic,
}

impl FallbackKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoAudio => "no_audio",
            Self::AudioUnclear => "audio_unclear",
            Self::NoAnswer => "no_answer",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for FallbackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Message for `kind` in `language`; languages without templates get English
pub fn fallback_message(kind: FallbackKind, language: &LanguageTag) -> &'static str {
    match (language.primary(), kind) {
        ("ml", FallbackKind::NoAudio) => {
            "ക്ഷമിക്കണം, നിങ്ങളുടെ ശബ്ദം ലഭിച്ചില്ല. ദയവായി വീണ്ടും ശ്രമിക്കുക."
        },
        ("ml", FallbackKind::AudioUnclear) => {
            "ക്ഷമിക്കണം, ശബ്ദം വ്യക്തമല്ല. ദയവായി ചെറിയ വാചകമായി വീണ്ടും പറയുക."
        },
        ("ml", FallbackKind::NoAnswer) => {
            "ക്ഷമിക്കണം, ഇപ്പോൾ ഉത്തരം നൽകാൻ കഴിഞ്ഞില്ല. ദയവായി Krishi Bhavan-നെ സന്ദർശിക്കുക."
        },
        ("ml", FallbackKind::Generic) => {
            "ക്ഷമിക്കണം, പ്രവേശനം പരിഗണിക്കപ്പെട്ടില്ല. പിന്നീട് ശ്രമിക്കുക."
        },
        (_, FallbackKind::NoAudio) => "Sorry, we did not receive your voice. Please try again.",
        (_, FallbackKind::AudioUnclear) => {
            "Sorry, the audio was not clear. Please say your question again in a short sentence."
        },
        (_, FallbackKind::NoAnswer) => {
            "Sorry, we could not find an answer right now. Please visit your local Krishi Bhavan."
        },
        (_, FallbackKind::Generic) => {
            "Sorry, your request could not be processed. Please try again later."
        },
    }
}

/// Answer given to a blank question
pub fn empty_question_message(language: &LanguageTag) -> &'static str {
    match language.primary() {
        "ml" => "ദയവായി നിങ്ങളുടെ കൃഷി സംബന്ധമായ ചോദ്യം ചോദിക്കുക.",
        _ => "Please ask a question about your crops or farm.",
    }
}

/// SMS body carrying an answer
pub fn answer_sms_body(answer: &str, language: &LanguageTag) -> String {
    let heading = match language.primary() {
        "ml" => "നിങ്ങളുടെ ചോദ്യം: ",
        _ => "Your question: ",
    };
    format!("{heading}\n\n{answer}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [FallbackKind; 4] = [
        FallbackKind::NoAudio,
        FallbackKind::AudioUnclear,
        FallbackKind::NoAnswer,
        FallbackKind::Generic,
    ];

    #[test]
    fn every_kind_has_a_non_empty_message() {
        for language in [LanguageTag::malayalam(), LanguageTag::english()] {
            for kind in KINDS {
                assert!(!fallback_message(kind, &language).is_empty());
            }
        }
    }

    #[test]
    fn region_subtags_use_the_primary_language() {
        let ml_in = LanguageTag::new("ml-IN").unwrap();
        assert_eq!(
            fallback_message(FallbackKind::NoAudio, &ml_in),
            fallback_message(FallbackKind::NoAudio, &LanguageTag::malayalam())
        );
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let ta = LanguageTag::new("ta").unwrap();
        assert_eq!(
            fallback_message(FallbackKind::Generic, &ta),
            fallback_message(FallbackKind::Generic, &LanguageTag::english())
        );
    }

    #[test]
    fn sms_body_layout() {
        assert_eq!(
            answer_sms_body("സ്പ്രേ ചെയ്യുക", &LanguageTag::malayalam()),
            "നിങ്ങളുടെ ചോദ്യം: \n\nസ്പ്രേ ചെയ്യുക\n"
        );
        assert_eq!(
            answer_sms_body("spray", &LanguageTag::english()),
            "Your question: \n\nspray\n"
        );
    }

    #[test]
    fn labels() {
        assert_eq!(FallbackKind::AudioUnclear.to_string(), "audio_unclear");
    }
}
