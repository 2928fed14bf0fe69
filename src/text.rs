//! Text helpers shared by the API clients.

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// This function:
/// - Truncates long text to `max_len` characters to prevent log flooding
/// - Replaces control characters that could manipulate log output
/// - Flattens newlines to prevent log injection
pub(crate) fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_len {
        let kept: String = sanitized.chars().take(max_len).collect();
        format!("{}... [truncated, {} total bytes]", kept, text.len())
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_flattens_control_characters() {
        assert_eq!(
            sanitize_for_logging("line one\nline\ttwo\u{7}", 100),
            "line one line two?"
        );
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let text = "é".repeat(10);
        assert_eq!(
            sanitize_for_logging(&text, 3),
            "ééé... [truncated, 20 total bytes]"
        );
    }
}
