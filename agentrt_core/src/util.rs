//! Small text helpers shared by the runtime crates.

/// Default system prompt when no instruction is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Truncate `text` to at most `max_chars` characters for log previews.
///
/// Cuts on a char boundary so multi-byte input never panics.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
