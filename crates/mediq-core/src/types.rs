use serde::{Deserialize, Serialize};

/// Attribution of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation, immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Ordered, append-only sequence of turns for one session.
///
/// Arrival order is the sole consistency guarantee; a conversation is owned
/// by exactly one session and never shared between control flows. A trailing
/// user turn with no following assistant turn is the "pending" turn that
/// still needs an answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text));
    }

    /// Append an assistant turn.
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::assistant(text));
    }

    /// The trailing user turn awaiting an answer, if any.
    pub fn pending_user(&self) -> Option<&Turn> {
        self.turns.last().filter(|t| t.role == Role::User)
    }

    /// All turns in arrival order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Answer tone requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Friendly,
    Child,
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Formal
    }
}

impl Tone {
    /// Parse a tone string; unknown values fall back to `Formal`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "friendly" => Tone::Friendly,
            "child" => Tone::Child,
            _ => Tone::Formal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Friendly => "friendly",
            Tone::Child => "child",
        }
    }
}

/// One request to the answer service; constructed fresh per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRequest {
    /// The question text.
    pub question: String,
    /// Formatted prior-turn context, possibly empty.
    pub context: String,
    /// Requested answer tone.
    pub tone: Tone,
    /// Whether to request a simplified, low-complexity explanation.
    pub simplify: bool,
}

impl AnswerRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: String::new(),
            tone: Tone::Formal,
            simplify: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Turn construction ----

    #[test]
    fn test_turn_constructors() {
        let t = Turn::user("hello");
        assert_eq!(t.role, Role::User);
        assert_eq!(t.text, "hello");

        let t = Turn::assistant("hi there");
        assert_eq!(t.role, Role::Assistant);
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }

    // ---- Conversation ----

    #[test]
    fn test_empty_conversation_has_no_pending() {
        let conv = Conversation::new();
        assert!(conv.is_empty());
        assert!(conv.pending_user().is_none());
    }

    #[test]
    fn test_pending_user_after_user_turn() {
        let mut conv = Conversation::new();
        conv.push_user("what is diabetes?");
        let pending = conv.pending_user().unwrap();
        assert_eq!(pending.text, "what is diabetes?");
    }

    #[test]
    fn test_no_pending_after_assistant_turn() {
        let mut conv = Conversation::new();
        conv.push_user("question");
        conv.push_assistant("answer");
        assert!(conv.pending_user().is_none());
    }

    #[test]
    fn test_turns_preserve_arrival_order() {
        let mut conv = Conversation::new();
        conv.push_user("q1");
        conv.push_assistant("a1");
        conv.push_user("q2");
        let turns = conv.turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].text, "q1");
        assert_eq!(turns[1].text, "a1");
        assert_eq!(turns[2].text, "q2");
    }

    #[test]
    fn test_assistant_only_turn_is_not_pending() {
        // Image/PDF results append assistant turns directly; they must not
        // leave the conversation in a pending state.
        let mut conv = Conversation::new();
        conv.push_assistant("image analysis result");
        assert!(conv.pending_user().is_none());
    }

    // ---- Tone ----

    #[test]
    fn test_tone_parse_known_values() {
        assert_eq!(Tone::parse("formal"), Tone::Formal);
        assert_eq!(Tone::parse("friendly"), Tone::Friendly);
        assert_eq!(Tone::parse("child"), Tone::Child);
        assert_eq!(Tone::parse("FRIENDLY"), Tone::Friendly);
    }

    #[test]
    fn test_tone_parse_unknown_falls_back_to_formal() {
        assert_eq!(Tone::parse("sarcastic"), Tone::Formal);
        assert_eq!(Tone::parse(""), Tone::Formal);
    }

    #[test]
    fn test_tone_as_str_roundtrip() {
        for tone in [Tone::Formal, Tone::Friendly, Tone::Child] {
            assert_eq!(Tone::parse(tone.as_str()), tone);
        }
    }

    // ---- AnswerRequest ----

    #[test]
    fn test_answer_request_defaults() {
        let req = AnswerRequest::new("what is diabetes?");
        assert_eq!(req.question, "what is diabetes?");
        assert!(req.context.is_empty());
        assert_eq!(req.tone, Tone::Formal);
        assert!(!req.simplify);
    }
}
