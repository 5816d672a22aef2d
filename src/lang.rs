//! Static UI strings keyed by two-letter language code.

/// Strings used by the board page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texts {
    pub add_thought_placeholder: &'static str,
    pub submit_button: &'static str,
    pub submitting_button: &'static str,
}

const EN: Texts = Texts {
    add_thought_placeholder: "Share a thought...",
    submit_button: "Share",
    submitting_button: "Sharing...",
};

const SV: Texts = Texts {
    add_thought_placeholder: "Dela en tanke...",
    submit_button: "Dela",
    submitting_button: "Delar...",
};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Pick a language from an `Accept-Language` header value.
///
/// Swedish wins whenever it is mentioned at all; everything else is English.
pub fn detect_language(accept_language: Option<&str>) -> &'static str {
    let header = accept_language.unwrap_or_default();
    let mentions_sv = header
        .split(',')
        .filter_map(|part| part.split(';').next())
        .map(|tag| tag.trim().to_ascii_lowercase())
        .any(|tag| tag == "sv" || tag.starts_with("sv-"));

    if mentions_sv {
        "sv"
    } else {
        DEFAULT_LANGUAGE
    }
}

/// Strings for `lang`, falling back to English for unknown codes.
pub fn texts(lang: &str) -> Texts {
    match lang {
        "sv" => SV,
        _ => EN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(None), "en");
        assert_eq!(detect_language(Some("")), "en");
        assert_eq!(detect_language(Some("en-US,en;q=0.9")), "en");
        assert_eq!(detect_language(Some("sv-SE,sv;q=0.9,en;q=0.8")), "sv");
        assert_eq!(detect_language(Some("en-GB, sv;q=0.5")), "sv");
        assert_eq!(detect_language(Some("SV")), "sv");
    }

    #[test]
    fn test_detect_language_ignores_lookalikes() {
        // "sw" (Swahili) or tags merely containing the letters should not match.
        assert_eq!(detect_language(Some("sw,en")), "en");
        assert_eq!(detect_language(Some("x-svenska")), "en");
    }

    #[test]
    fn test_texts_fallback() {
        assert_eq!(texts("sv").submit_button, "Dela");
        assert_eq!(texts("en").submit_button, "Share");
        assert_eq!(texts("de"), texts("en"));
    }
}
