//! Bounded context window construction.
//!
//! The context sent to the answer service is a derived projection of the
//! conversation: the last few completed user/assistant pairs, formatted as
//! plain text. It is recomputed on every turn and never stored.

use mediq_core::types::{Conversation, Role};

/// Build the bounded context window for the next answer.
///
/// Scans for adjacent (user, assistant) pairs, keeps the last `max_pairs`,
/// and formats each as `"User: {q}\nAssistant: {a}"`, joined by blank
/// lines. A trailing pending user turn has no assistant partner and is
/// therefore never part of its own context.
pub fn build_context(conversation: &Conversation, max_pairs: usize) -> String {
    let turns = conversation.turns();
    let mut pairs: Vec<String> = Vec::new();

    let mut i = 0;
    while i + 1 < turns.len() {
        if turns[i].role == Role::User && turns[i + 1].role == Role::Assistant {
            pairs.push(format!(
                "User: {}\nAssistant: {}",
                turns[i].text,
                turns[i + 1].text
            ));
            i += 2;
        } else {
            i += 1;
        }
    }

    let start = pairs.len().saturating_sub(max_pairs);
    pairs[start..].join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation_with_pairs(n: usize) -> Conversation {
        let mut conv = Conversation::new();
        for i in 1..=n {
            conv.push_user(format!("q{}", i));
            conv.push_assistant(format!("a{}", i));
        }
        conv
    }

    #[test]
    fn test_empty_conversation_empty_context() {
        let conv = Conversation::new();
        assert_eq!(build_context(&conv, 3), "");
    }

    #[test]
    fn test_single_pair_formatting() {
        let conv = conversation_with_pairs(1);
        assert_eq!(build_context(&conv, 3), "User: q1\nAssistant: a1");
    }

    #[test]
    fn test_pairs_joined_by_blank_lines() {
        let conv = conversation_with_pairs(2);
        assert_eq!(
            build_context(&conv, 3),
            "User: q1\nAssistant: a1\n\nUser: q2\nAssistant: a2"
        );
    }

    #[test]
    fn test_pending_turn_excluded_from_own_context() {
        let mut conv = conversation_with_pairs(1);
        conv.push_user("pending question");
        let ctx = build_context(&conv, 3);
        assert!(!ctx.contains("pending question"));
        assert_eq!(ctx, "User: q1\nAssistant: a1");
    }

    #[test]
    fn test_keeps_only_last_max_pairs() {
        // Five complete pairs plus a pending turn: exactly the last three
        // pairs survive.
        let mut conv = conversation_with_pairs(5);
        conv.push_user("pending");
        let ctx = build_context(&conv, 3);
        assert!(!ctx.contains("q1"));
        assert!(!ctx.contains("q2"));
        assert_eq!(
            ctx,
            "User: q3\nAssistant: a3\n\nUser: q4\nAssistant: a4\n\nUser: q5\nAssistant: a5"
        );
    }

    #[test]
    fn test_max_pairs_zero_yields_empty() {
        let conv = conversation_with_pairs(2);
        assert_eq!(build_context(&conv, 0), "");
    }

    #[test]
    fn test_pending_only_conversation_empty_context() {
        let mut conv = Conversation::new();
        conv.push_user("first ever question");
        assert_eq!(build_context(&conv, 3), "");
    }

    #[test]
    fn test_consecutive_assistant_turns_not_paired() {
        // Image and PDF results append assistant turns with no user partner;
        // they are not question/answer pairs and stay out of the context.
        let mut conv = Conversation::new();
        conv.push_assistant("image analysis");
        conv.push_user("q1");
        conv.push_assistant("a1");
        let ctx = build_context(&conv, 3);
        assert_eq!(ctx, "User: q1\nAssistant: a1");
    }

    #[test]
    fn test_fewer_pairs_than_max() {
        let conv = conversation_with_pairs(2);
        let ctx = build_context(&conv, 5);
        assert!(ctx.contains("q1"));
        assert!(ctx.contains("q2"));
    }
}
