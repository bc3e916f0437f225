//! Prompt construction and token-budget truncation.


use std::sync::Arc;

use tracing::debug;

use crate::inference::{InferenceError, TextTokenizer};

/// Replaces each `\n` and each `\r` with a single space.
pub fn normalize_document(document: &str) -> String {
    document.replace(['\n', '\r'], " ")
}

/// `Query: {query} Document: {document} Relevant:` for seq2seq relevance models.
pub fn pair_prompt(query: &str, document: &str) -> String {
    format!(
        "Query: {} Document: {} Relevant:",
        query,
        normalize_document(document)
    )
}

/// Collapses whitespace runs, trims, then replaces each run of `|` or `-` with one space.
pub fn clean_document(document: &str) -> String {
    let collapsed = document.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut cleaned = String::with_capacity(collapsed.len());
    let mut in_run = false;
    for ch in collapsed.chars() {
        if ch == '|' || ch == '-' {
            if !in_run {
                cleaned.push(' ');
                in_run = true;
            }
        } else {
            cleaned.push(ch);
            in_run = false;
        }
    }
    cleaned
}

/// TREC-assessor prompt for chat models.
///
/// The narrative block appears only when `narrative` is non-empty.
pub fn assessor_prompt(query: &str, narrative: Option<&str>, document: &str) -> String {
    let mut prompt = String::from(
        "You are an expert TREC assessor. Your task is to judge relevance.\n\n\
         Instructions:\n\
         \t1. Read the query carefully.\n\
         \t2. Read the document.\n\
         \t3. Decide if the document provides information that answers or helps address the query.\n\
         \t4. Respond with 'true' if the document is relevant, or 'false' if it is not.\n\n",
    );

    prompt.push_str("Query: ");
    prompt.push_str(query.trim());
    prompt.push_str("\n\n");

    if let Some(narrative) = narrative.filter(|n| !n.is_empty()) {
        prompt.push_str("Assessor instructions:\n");
        prompt.push_str(narrative);
        prompt.push_str("\n\n");
    }

    prompt.push_str("Document:\n");
    prompt.push_str(&clean_document(document));
    prompt.push('\n');

    prompt
}

/// Result of [`PromptTruncator::truncate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub text: String,
    pub original_tokens: usize,
    pub kept_tokens: usize,
}

impl Truncated {
    pub fn was_truncated(&self) -> bool {
        self.kept_tokens < self.original_tokens
    }
}

/// Hard token-count cutoff: keeps the first `max_tokens` ids and decodes them back to text.
#[derive(Clone)]
pub struct PromptTruncator {
    tokenizer: Arc<dyn TextTokenizer>,
    max_tokens: usize,
}

impl std::fmt::Debug for PromptTruncator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTruncator")
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl PromptTruncator {
    pub fn new(tokenizer: Arc<dyn TextTokenizer>, max_tokens: usize) -> Self {
        Self {
            tokenizer,
            max_tokens,
        }
    }

    /// Prompts within budget are returned verbatim.
    pub fn truncate(&self, prompt: &str) -> Result<Truncated, InferenceError> {
        let ids = self.tokenizer.encode(prompt)?;
        let original_tokens = ids.len();

        if original_tokens <= self.max_tokens {
            return Ok(Truncated {
                text: prompt.to_string(),
                original_tokens,
                kept_tokens: original_tokens,
            });
        }

        let text = self.tokenizer.decode(&ids[..self.max_tokens])?;

        debug!(
            original_tokens,
            kept_tokens = self.max_tokens,
            "Truncated prompt to token budget"
        );

        Ok(Truncated {
            text,
            original_tokens,
            kept_tokens: self.max_tokens,
        })
    }
}
