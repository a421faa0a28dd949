//! MedIQ highlight crate - named-entity markup for answer text.
//!
//! Provides the EntityTagger trait for recognizing medical entity spans,
//! an HttpEntityTagger that calls a token-classification inference
//! endpoint, and a span-offset highlighter that wraps each recognized
//! span as `**{emoji} {text}**`.

use std::future::Future;

use serde::Deserialize;

use mediq_core::error::MediqError;

// =============================================================================
// Types
// =============================================================================

/// One recognized entity span, with byte offsets into the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    /// Byte offset of the span start.
    pub start: usize,
    /// Byte offset one past the span end.
    pub end: usize,
    /// The entity text as recognized.
    pub text: String,
    /// Entity category (e.g., "DISEASE", "SYMPTOM", "MEDICATION").
    pub category: String,
}

/// Emoji marker for an entity category. Unknown categories map to 🔍.
pub fn category_emoji(category: &str) -> &'static str {
    match category.to_uppercase().as_str() {
        "DISEASE" => "\u{1f9a0}",    // 🦠
        "SYMPTOM" => "\u{1f912}",    // 🤒
        "MEDICATION" => "\u{1f48a}", // 💊
        _ => "\u{1f50d}",            // 🔍
    }
}

// =============================================================================
// Trait
// =============================================================================

/// Service recognizing entity spans in plain text.
pub trait EntityTagger: Send + Sync {
    /// Recognize entity spans in the given text.
    ///
    /// # Returns
    /// Spans with byte offsets into `text`. May be empty.
    fn tag(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<EntitySpan>, MediqError>> + Send;
}

// =============================================================================
// Highlighting
// =============================================================================

/// Wrap each recognized span as `**{emoji} {text}**`.
///
/// Replacement is span-offset based, applied once per span in reverse-offset
/// order so earlier offsets stay valid. Spans that overlap a previously
/// applied one, run past the end of the text, or fall on a non-character
/// boundary are skipped.
pub fn apply_spans(text: &str, spans: &[EntitySpan]) -> String {
    let mut ordered: Vec<&EntitySpan> = spans
        .iter()
        .filter(|s| {
            s.start < s.end
                && s.end <= text.len()
                && text.is_char_boundary(s.start)
                && text.is_char_boundary(s.end)
        })
        .collect();
    ordered.sort_by_key(|s| s.start);

    // Drop spans overlapping their predecessor.
    let mut kept: Vec<&EntitySpan> = Vec::with_capacity(ordered.len());
    for span in ordered {
        if kept.last().map_or(true, |prev| span.start >= prev.end) {
            kept.push(span);
        }
    }

    let mut result = text.to_string();
    for span in kept.iter().rev() {
        let emoji = category_emoji(&span.category);
        let wrapped = format!("**{} {}**", emoji, &text[span.start..span.end]);
        result.replace_range(span.start..span.end, &wrapped);
    }
    result
}

/// Tag and highlight in one step.
///
/// A tagger failure is surfaced to the caller; the orchestrator decides
/// whether to degrade to the unhighlighted text.
pub async fn highlight<T: EntityTagger>(tagger: &T, text: &str) -> Result<String, MediqError> {
    let spans = tagger.tag(text).await?;
    if spans.is_empty() {
        return Ok(text.to_string());
    }
    Ok(apply_spans(text, &spans))
}

// =============================================================================
// HTTP tagger
// =============================================================================

/// Grouped-entity row returned by a token-classification endpoint.
#[derive(Debug, Deserialize)]
struct TaggerRow {
    entity_group: String,
    word: String,
    start: usize,
    end: usize,
}

/// Entity tagger backed by a hosted token-classification model.
pub struct HttpEntityTagger {
    client: reqwest::Client,
    url: String,
}

impl HttpEntityTagger {
    /// Create a tagger for the given inference endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl EntityTagger for HttpEntityTagger {
    async fn tag(&self, text: &str) -> Result<Vec<EntitySpan>, MediqError> {
        let body = serde_json::json!({ "inputs": text });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MediqError::Highlight(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MediqError::Highlight(format!(
                "tagger returned {}: {}",
                status, error_text
            )));
        }

        let rows: Vec<TaggerRow> = response
            .json()
            .await
            .map_err(|e| MediqError::Highlight(format!("invalid response body: {}", e)))?;

        tracing::debug!(entities = rows.len(), "Entity tagger response");

        Ok(rows
            .into_iter()
            .map(|r| EntitySpan {
                start: r.start,
                end: r.end,
                text: r.word,
                category: r.entity_group,
            })
            .collect())
    }
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Mock tagger that recognizes a fixed term list.
///
/// Tags every occurrence of each configured term, which makes the
/// repeated-token behavior of the highlighter testable without a model.
#[derive(Debug, Clone, Default)]
pub struct MockEntityTagger {
    terms: Vec<(String, String)>,
}

impl MockEntityTagger {
    /// Create a mock recognizing the given (term, category) pairs.
    pub fn with_terms(terms: &[(&str, &str)]) -> Self {
        Self {
            terms: terms
                .iter()
                .map(|(t, c)| (t.to_string(), c.to_string()))
                .collect(),
        }
    }

    /// Create a mock that recognizes nothing.
    pub fn empty() -> Self {
        Self { terms: Vec::new() }
    }
}

impl EntityTagger for MockEntityTagger {
    async fn tag(&self, text: &str) -> Result<Vec<EntitySpan>, MediqError> {
        let mut spans = Vec::new();
        for (term, category) in &self.terms {
            for (start, matched) in text.match_indices(term.as_str()) {
                spans.push(EntitySpan {
                    start,
                    end: start + matched.len(),
                    text: matched.to_string(),
                    category: category.clone(),
                });
            }
        }
        Ok(spans)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, text: &str, category: &str) -> EntitySpan {
        EntitySpan {
            start,
            end,
            text: text.to_string(),
            category: category.to_string(),
        }
    }

    // ---- Emoji lookup ----

    #[test]
    fn test_category_emoji_known() {
        assert_eq!(category_emoji("DISEASE"), "\u{1f9a0}");
        assert_eq!(category_emoji("SYMPTOM"), "\u{1f912}");
        assert_eq!(category_emoji("MEDICATION"), "\u{1f48a}");
    }

    #[test]
    fn test_category_emoji_case_insensitive() {
        assert_eq!(category_emoji("disease"), "\u{1f9a0}");
        assert_eq!(category_emoji("Medication"), "\u{1f48a}");
    }

    #[test]
    fn test_category_emoji_unknown_default() {
        assert_eq!(category_emoji("PERSON"), "\u{1f50d}");
        assert_eq!(category_emoji(""), "\u{1f50d}");
    }

    // ---- apply_spans ----

    #[test]
    fn test_apply_single_span() {
        let text = "diabetes is chronic";
        let out = apply_spans(text, &[span(0, 8, "diabetes", "DISEASE")]);
        assert_eq!(out, "**\u{1f9a0} diabetes** is chronic");
    }

    #[test]
    fn test_apply_multiple_spans_preserves_offsets() {
        let text = "take aspirin for fever";
        let spans = vec![
            span(5, 12, "aspirin", "MEDICATION"),
            span(17, 22, "fever", "SYMPTOM"),
        ];
        let out = apply_spans(text, &spans);
        assert_eq!(
            out,
            "take **\u{1f48a} aspirin** for **\u{1f912} fever**"
        );
    }

    #[test]
    fn test_apply_spans_unsorted_input() {
        let text = "take aspirin for fever";
        let spans = vec![
            span(17, 22, "fever", "SYMPTOM"),
            span(5, 12, "aspirin", "MEDICATION"),
        ];
        let out = apply_spans(text, &spans);
        assert!(out.contains("**\u{1f48a} aspirin**"));
        assert!(out.contains("**\u{1f912} fever**"));
    }

    #[test]
    fn test_repeated_token_each_span_wrapped_once() {
        // Offset-based replacement wraps each occurrence exactly once, with
        // no drift from earlier substitutions.
        let text = "fever then fever again";
        let spans = vec![
            span(0, 5, "fever", "SYMPTOM"),
            span(11, 16, "fever", "SYMPTOM"),
        ];
        let out = apply_spans(text, &spans);
        assert_eq!(
            out,
            "**\u{1f912} fever** then **\u{1f912} fever** again"
        );
    }

    #[test]
    fn test_overlapping_spans_first_wins() {
        let text = "chronic kidney disease";
        let spans = vec![
            span(8, 22, "kidney disease", "DISEASE"),
            span(8, 14, "kidney", "DISEASE"),
        ];
        let out = apply_spans(text, &spans);
        // Only one of the overlapping spans applies.
        assert_eq!(out.matches("**").count(), 2);
    }

    #[test]
    fn test_out_of_bounds_span_skipped() {
        let text = "short";
        let out = apply_spans(text, &[span(0, 99, "short", "DISEASE")]);
        assert_eq!(out, "short");
    }

    #[test]
    fn test_non_char_boundary_span_skipped() {
        let text = "\u{4f60}\u{597d} doctor"; // multibyte prefix
        let out = apply_spans(text, &[span(1, 4, "x", "DISEASE")]);
        assert_eq!(out, text);
    }

    #[test]
    fn test_empty_spans_identity() {
        let text = "no entities here";
        assert_eq!(apply_spans(text, &[]), text);
    }

    // ---- highlight ----

    #[tokio::test]
    async fn test_highlight_with_mock() {
        let tagger = MockEntityTagger::with_terms(&[("diabetes", "DISEASE")]);
        let out = highlight(&tagger, "diabetes affects insulin").await.unwrap();
        assert_eq!(out, "**\u{1f9a0} diabetes** affects insulin");
    }

    #[tokio::test]
    async fn test_highlight_no_entities_identity() {
        let tagger = MockEntityTagger::empty();
        let text = "completely ordinary sentence";
        let out = highlight(&tagger, text).await.unwrap();
        assert_eq!(out, text);
    }

    #[tokio::test]
    async fn test_highlight_idempotent_when_no_entities() {
        let tagger = MockEntityTagger::empty();
        let once = highlight(&tagger, "plain text").await.unwrap();
        let twice = highlight(&tagger, &once).await.unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_highlight_all_occurrences() {
        let tagger = MockEntityTagger::with_terms(&[("fever", "SYMPTOM")]);
        let out = highlight(&tagger, "fever and fever").await.unwrap();
        assert_eq!(out.matches("**\u{1f912} fever**").count(), 2);
    }

    // ---- HTTP row mapping ----

    #[test]
    fn test_tagger_row_deserialization() {
        let json = r#"[{"entity_group":"DISEASE","word":"diabetes","start":0,"end":8,"score":0.99}]"#;
        let rows: Vec<TaggerRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity_group, "DISEASE");
        assert_eq!(rows[0].word, "diabetes");
        assert_eq!(rows[0].start, 0);
        assert_eq!(rows[0].end, 8);
    }
}
