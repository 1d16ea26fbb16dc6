//! Prompt assembly for context-bounded answers.
//!
//! Retrieved chunks are joined by a blank line in rank order and capped by a token budget
//! measured with `tiktoken-rs` (`cl100k_base`). When the encoding cannot be loaded a whitespace
//! counter is used instead.

use super::types::ScoredChunk;
use std::sync::Arc;
use tiktoken_rs::cl100k_base;

/// Counts tokens in a text segment.
pub type TokenCounter = Arc<dyn Fn(&str) -> usize + Send + Sync>;

const PROMPT_HEADER: &str = "Answer the questions based on the provided context only.\n\
Provide the most accurate response based on the question.\n";

/// Build a token counter from the `cl100k_base` encoding, falling back to whitespace counting.
pub fn default_token_counter() -> TokenCounter {
    match cl100k_base() {
        Ok(encoding) => {
            let encoding = Arc::new(encoding);
            Arc::new(move |segment: &str| encoding.encode_ordinary(segment).len())
        }
        Err(error) => {
            tracing::warn!(
                error = %error,
                "cl100k_base unavailable; falling back to whitespace token counter"
            );
            whitespace_token_counter()
        }
    }
}

/// Count whitespace-separated words; non-empty text always counts as at least one token.
pub fn whitespace_token_counter() -> TokenCounter {
    Arc::new(|segment: &str| {
        let tokens = segment.split_whitespace().count();
        if tokens == 0 && !segment.is_empty() {
            1
        } else {
            tokens
        }
    })
}

/// Join chunk texts with blank lines, keeping whole chunks while they fit in `token_budget`.
///
/// If even the top-ranked chunk exceeds the budget, its longest fitting prefix is used so the
/// model always receives some context.
pub fn build_context(chunks: &[ScoredChunk], token_budget: usize, counter: &TokenCounter) -> String {
    let mut context = String::new();

    for hit in chunks {
        let candidate = if context.is_empty() {
            hit.chunk.text.clone()
        } else {
            format!("{context}\n\n{}", hit.chunk.text)
        };

        if counter.as_ref()(&candidate) <= token_budget {
            context = candidate;
            continue;
        }

        if context.is_empty() {
            context = truncate_to_budget(&hit.chunk.text, token_budget, counter);
        }
        break;
    }

    context
}

/// Render the full prompt sent to the language model.
pub fn compose_prompt(
    question: &str,
    chunks: &[ScoredChunk],
    token_budget: usize,
    counter: &TokenCounter,
) -> String {
    let context = build_context(chunks, token_budget, counter);
    format!("{PROMPT_HEADER}<context>\n{context}\n</context>\nQuestions: {question}\n")
}

fn truncate_to_budget(text: &str, token_budget: usize, counter: &TokenCounter) -> String {
    if token_budget == 0 {
        return String::new();
    }

    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();

    // binary search for the longest prefix that fits
    let (mut low, mut high) = (0, boundaries.len() - 1);
    while low < high {
        let mid = (low + high + 1) / 2;
        if counter.as_ref()(&text[..boundaries[mid]]) <= token_budget {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    text[..boundaries[low]].trim_end().to_string()
}
