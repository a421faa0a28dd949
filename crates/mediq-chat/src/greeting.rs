//! Greeting detection and canned localized replies.
//!
//! Salutations are answered from a fixed table instead of invoking the
//! generative model. Matching is exact on the normalized text: a greeting
//! embedded in a longer sentence is NOT a greeting, so real questions that
//! merely open with "hi" still reach the model.

/// Fixed multilingual greeting set, matched against normalized input.
const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "bonjour",
    "salut",
    "hola",
    "hallo",
    "namaste",
    "\u{4f60}\u{597d}",           // 你好
    "\u{928}\u{92e}\u{938}\u{94d}\u{924}\u{947}", // नमस्ते
];

/// Lowercase and strip punctuation, collapsing surrounding whitespace.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Whether the text is exactly one greeting from the fixed set.
pub fn is_greeting(text: &str) -> bool {
    let normalized = normalize(text);
    !normalized.is_empty() && GREETINGS.contains(&normalized.as_str())
}

/// Canned greeting reply for the given output language, defaulting to English.
pub fn canned_greeting(lang: &str) -> &'static str {
    match lang {
        "fr" => "Bonjour ! Comment puis-je vous aider aujourd'hui ?",
        "es" => "\u{a1}Hola! \u{bf}En qu\u{e9} puedo ayudarte hoy?",
        "de" => "Hallo! Wie kann ich Ihnen heute helfen?",
        "hi" => "\u{928}\u{92e}\u{938}\u{94d}\u{924}\u{947}! \u{92e}\u{948}\u{902} \u{906}\u{92a}\u{915}\u{940} \u{915}\u{948}\u{938}\u{947} \u{92e}\u{926}\u{926} \u{915}\u{930} \u{938}\u{915}\u{924}\u{940} \u{939}\u{942}\u{901}?",
        "zh" => "\u{4f60}\u{597d}\u{ff01}\u{4eca}\u{5929}\u{6211}\u{80fd}\u{5e2e}\u{60a8}\u{4ec0}\u{4e48}\u{5417}\u{ff1f}",
        _ => "Hello! How can I help you today?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Membership ----

    #[test]
    fn test_plain_greetings_match() {
        for g in ["hi", "hello", "hey", "bonjour", "hola", "hallo", "namaste"] {
            assert!(is_greeting(g), "{} should be a greeting", g);
        }
    }

    #[test]
    fn test_chinese_greeting_matches() {
        assert!(is_greeting("\u{4f60}\u{597d}"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_greeting("Hello"));
        assert!(is_greeting("BONJOUR"));
        assert!(is_greeting("HeY"));
    }

    #[test]
    fn test_punctuation_stripped() {
        assert!(is_greeting("hi!"));
        assert!(is_greeting("Hello!!!"));
        assert!(is_greeting("bonjour."));
        assert!(is_greeting("hola, "));
        assert!(is_greeting("\u{4f60}\u{597d}\u{ff01}"));
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert!(is_greeting("  hi  "));
    }

    // ---- Precision over recall ----

    #[test]
    fn test_embedded_greeting_does_not_match() {
        assert!(!is_greeting("hi doctor"));
        assert!(!is_greeting("hello, what is diabetes?"));
        assert!(!is_greeting("say hello"));
        assert!(!is_greeting("hi hi"));
    }

    #[test]
    fn test_empty_and_whitespace_do_not_match() {
        assert!(!is_greeting(""));
        assert!(!is_greeting("   "));
        assert!(!is_greeting("!!!"));
    }

    #[test]
    fn test_non_greeting_words_do_not_match() {
        assert!(!is_greeting("high"));
        assert!(!is_greeting("diabetes"));
    }

    // ---- Canned replies ----

    #[test]
    fn test_canned_greeting_french() {
        assert_eq!(
            canned_greeting("fr"),
            "Bonjour ! Comment puis-je vous aider aujourd'hui ?"
        );
    }

    #[test]
    fn test_canned_greeting_defaults_to_english() {
        assert_eq!(canned_greeting("en"), "Hello! How can I help you today?");
        assert_eq!(canned_greeting("xx"), "Hello! How can I help you today?");
        assert_eq!(canned_greeting(""), "Hello! How can I help you today?");
    }

    #[test]
    fn test_canned_greetings_all_nonempty() {
        for lang in ["en", "fr", "es", "de", "hi", "zh"] {
            assert!(!canned_greeting(lang).is_empty());
        }
    }
}
