//! Text cleaning and deterministic line-based chunking.
//!
//! Chunking is the first stage of a pipeline run: it turns the flattened
//! corpus text into bounded-size passages that the embedding provider can
//! handle. Both functions here are pure and synchronous — same input, same
//! output, no I/O and no failure modes.

/// Approximate characters per token, used to turn a token budget into a
/// character budget. This is a deliberate simplification, not tokenization.
const CHARS_PER_TOKEN: usize = 4;

/// Normalize whitespace in raw corpus text.
///
/// Collapses runs of two or more consecutive newlines to a single newline,
/// then trims leading and trailing whitespace.
pub fn clean_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut last_was_newline = false;
    for ch in text.chars() {
        if ch == '\n' {
            if !last_was_newline {
                cleaned.push('\n');
            }
            last_was_newline = true;
        } else {
            cleaned.push(ch);
            last_was_newline = false;
        }
    }
    cleaned.trim().to_string()
}

/// Split cleaned text into chunks of at most `max_tokens * 4` characters.
///
/// Lines are accumulated into a buffer; a line joins the current buffer as
/// long as the buffer stays under the character budget, otherwise the buffer
/// is sealed as a chunk and the line starts a new one. The final non-empty
/// buffer is always sealed.
///
/// A single line longer than the budget is emitted as one oversized chunk
/// rather than being split mid-line. This is a documented limitation.
///
/// Empty input yields zero chunks.
pub fn chunk_text(text: &str, max_tokens: usize) -> Vec<String> {
    let budget = max_tokens * CHARS_PER_TOKEN;
    let mut chunks = Vec::new();
    let mut buffer = String::new();

    for line in text.split('\n') {
        if buffer.chars().count() + line.chars().count() < budget {
            buffer.push_str(line);
            buffer.push('\n');
        } else {
            let sealed = buffer.trim_end();
            if !sealed.is_empty() {
                chunks.push(sealed.to_string());
            }
            buffer = String::from(line);
            buffer.push('\n');
        }
    }

    let sealed = buffer.trim_end();
    if !sealed.is_empty() {
        chunks.push(sealed.to_string());
    }

    chunks
}
