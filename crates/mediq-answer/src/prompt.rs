//! Prompt templates for the answer service.
//!
//! Two templates exist: a tone-driven one for regular answers and a
//! dedicated plain-language one for simplify mode. Simplify always wins
//! over tone.

use mediq_core::types::{AnswerRequest, Tone};

/// Instruction phrase for each tone.
fn tone_phrase(tone: Tone) -> &'static str {
    match tone {
        Tone::Formal => "Give a detailed medical explanation.",
        Tone::Friendly => "Respond warmly and clearly.",
        Tone::Child => "Explain like to a 10-year-old.",
    }
}

/// Build the full prompt for one answer request.
pub fn build_prompt(request: &AnswerRequest) -> String {
    if request.simplify {
        format!(
            "You are a helpful multilingual medical assistant.\n\
             Context: {}\n\
             Question: {}\n\
             Please answer in 2-4 short sentences, using very simple words, \
             as if explaining to a young child or someone with no medical \
             background. Do not include technical details, long explanations, \
             or any greetings.\n\nAnswer:",
            request.context, request.question
        )
    } else {
        format!(
            "You are a helpful multilingual medical assistant.\n\
             Context: {}\n\
             Question: {}\n\
             Tone: {}\n\nAnswer:",
            request.context,
            request.question,
            tone_phrase(request.tone)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(question: &str, context: &str, tone: Tone, simplify: bool) -> AnswerRequest {
        AnswerRequest {
            question: question.to_string(),
            context: context.to_string(),
            tone,
            simplify,
        }
    }

    #[test]
    fn test_prompt_contains_question_and_context() {
        let req = request("What is diabetes?", "User: hi\nAssistant: hello", Tone::Formal, false);
        let prompt = build_prompt(&req);
        assert!(prompt.contains("Question: What is diabetes?"));
        assert!(prompt.contains("Context: User: hi\nAssistant: hello"));
    }

    #[test]
    fn test_formal_tone_phrase() {
        let prompt = build_prompt(&request("q", "", Tone::Formal, false));
        assert!(prompt.contains("Tone: Give a detailed medical explanation."));
    }

    #[test]
    fn test_friendly_tone_phrase() {
        let prompt = build_prompt(&request("q", "", Tone::Friendly, false));
        assert!(prompt.contains("Tone: Respond warmly and clearly."));
    }

    #[test]
    fn test_child_tone_phrase() {
        let prompt = build_prompt(&request("q", "", Tone::Child, false));
        assert!(prompt.contains("Tone: Explain like to a 10-year-old."));
    }

    #[test]
    fn test_simplify_uses_dedicated_template() {
        let prompt = build_prompt(&request("q", "", Tone::Formal, true));
        assert!(prompt.contains("2-4 short sentences"));
        assert!(!prompt.contains("Tone:"));
    }

    #[test]
    fn test_simplify_overrides_tone() {
        // Simplify mode ignores the tone entirely.
        let prompt = build_prompt(&request("q", "", Tone::Child, true));
        assert!(!prompt.contains("10-year-old."));
        assert!(prompt.contains("no medical"));
    }

    #[test]
    fn test_prompt_ends_with_answer_marker() {
        for simplify in [false, true] {
            let prompt = build_prompt(&request("q", "", Tone::Formal, simplify));
            assert!(prompt.ends_with("Answer:"));
        }
    }

    #[test]
    fn test_empty_context_still_has_context_line() {
        let prompt = build_prompt(&request("q", "", Tone::Formal, false));
        assert!(prompt.contains("Context: \n"));
    }
}
