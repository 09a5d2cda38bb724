//! Minimal TwiML documents

/// Empty acknowledgement returned to Twilio webhooks
pub fn empty_response() -> String {
    "<Response></Response>".to_string()
}

/// Document that plays one audio file
pub fn play_response(url: &str) -> String {
    format!("<Response><Play>{}</Play></Response>", escape_xml(url))
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty() {
        assert_eq!(empty_response(), "<Response></Response>");
    }

    #[test]
    fn play_escapes_query_strings() {
        assert_eq!(
            play_response("http://h/tts_1.mp3?a=1&b=2"),
            "<Response><Play>http://h/tts_1.mp3?a=1&amp;b=2</Play></Response>"
        );
    }

    proptest! {
        #[test]
        fn escaped_body_has_no_raw_markup(url in ".*") {
            let doc = play_response(&url);
            let inner = doc
                .strip_prefix("<Response><Play>")
                .and_then(|s| s.strip_suffix("</Play></Response>"))
                .unwrap();
            prop_assert!(!inner.contains('<'));
            prop_assert!(!inner.contains('>'));
        }
    }
}
