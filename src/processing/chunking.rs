//! Character-window chunking with overlap.
//!
//! Each page is split on its own so a chunk never spans two pages. `semchunk-rs` produces base
//! segments by recursing through progressively finer separators (newlines, whitespace,
//! punctuation, characters) with a character budget of roughly `chunk_size - overlap`. Every segment
//! after the first is then prefixed with the tail of its predecessor, snapped forward to a word
//! boundary, so neighbouring chunks share roughly `overlap` characters and no chunk exceeds
//! `chunk_size`.

use super::types::{ChunkingError, DocumentChunk, PageText};
use semchunk_rs::Chunker;

/// Split pages into overlapping chunks that carry their page's provenance.
///
/// Pages with no visible text contribute nothing; an empty page list yields an empty result.
pub fn split_pages(
    pages: &[PageText],
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<DocumentChunk>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if overlap >= chunk_size {
        return Err(ChunkingError::OverlapTooLarge {
            chunk_size,
            overlap,
        });
    }

    // one character is reserved for the space joining the overlap tail to the segment
    let segment_budget = (chunk_size - overlap)
        .saturating_sub(usize::from(overlap > 0))
        .max(1);
    let chunker = Chunker::new(segment_budget, Box::new(char_count));
    let mut chunks = Vec::new();

    for page in pages {
        if page.text.trim().is_empty() {
            continue;
        }
        let segments = chunker.chunk(&page.text);
        chunks.extend(
            apply_overlap(segments, chunk_size, overlap)
                .into_iter()
                .map(|text| DocumentChunk {
                    text,
                    source: page.source.clone(),
                }),
        );
    }

    Ok(chunks)
}

fn char_count(segment: &str) -> usize {
    segment.chars().count()
}

fn apply_overlap(segments: Vec<String>, chunk_size: usize, overlap: usize) -> Vec<String> {
    if overlap == 0 || segments.len() < 2 {
        return segments;
    }

    let mut windows = Vec::with_capacity(segments.len());
    windows.push(segments[0].clone());

    for pair in segments.windows(2) {
        windows.push(join_with_tail(&pair[0], &pair[1], chunk_size, overlap));
    }

    windows
}

fn join_with_tail(previous: &str, current: &str, chunk_size: usize, overlap: usize) -> String {
    let current_len = char_count(current);
    let mut limit = overlap;

    loop {
        let tail = tail_within(previous, limit);
        let needs_space = !tail.is_empty()
            && !ends_with_whitespace(tail)
            && !starts_with_whitespace(current);
        let total = char_count(tail) + usize::from(needs_space) + current_len;

        if total <= chunk_size || limit == 0 {
            let mut combined = String::with_capacity(tail.len() + current.len() + 1);
            combined.push_str(tail);
            if needs_space {
                combined.push(' ');
            }
            combined.push_str(current);
            return combined;
        }
        limit -= 1;
    }
}

/// Longest suffix of `text` holding at most `limit` characters that starts on a word boundary.
///
/// Falls back to a mid-word cut when the window contains no whitespace at all.
fn tail_within(text: &str, limit: usize) -> &str {
    if limit == 0 {
        return "";
    }

    let total = char_count(text);
    if total <= limit {
        return text.trim_start();
    }

    let start = text
        .char_indices()
        .nth(total - limit)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len());
    let window = &text[start..];

    let cut_mid_word = text[..start]
        .chars()
        .next_back()
        .map(|c| !c.is_whitespace())
        .unwrap_or(false);
    if !cut_mid_word {
        return window.trim_start();
    }

    match window.find(char::is_whitespace) {
        Some(boundary) => window[boundary..].trim_start(),
        None => window,
    }
}

fn starts_with_whitespace(text: &str) -> bool {
    text.chars()
        .next()
        .map(|c| c.is_whitespace())
        .unwrap_or(false)
}

fn ends_with_whitespace(text: &str) -> bool {
    text.chars()
        .next_back()
        .map(|c| c.is_whitespace())
        .unwrap_or(false)
}
