//! UTF-8-safe truncation and wrapping helpers for terminal output.
//!
//! Tool arguments and results can be arbitrarily long and multi-byte; byte
//! slicing them directly can panic mid-character.

/// Truncate by characters and append `suffix` when truncation occurs.
pub fn truncate_with_suffix_by_chars(text: &str, max_chars: usize, suffix: &str) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_chars).collect();
    format!("{prefix}{suffix}")
}

/// Flatten line breaks to spaces and cap at `max_chars` characters.
pub fn truncate_single_line(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    truncate_with_suffix_by_chars(&flat, max_chars, "...")
}

/// Split `text` into rows of at most `width` characters. Nothing is dropped:
/// concatenating the rows gives back `text`.
pub fn wrap_by_chars(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
