//! Utility functions for safe string handling.

/// Find the largest byte index <= `i` that is on a UTF-8 char boundary.
fn floor_char_boundary(s: &str, i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    let mut pos = i;
    // Walk backwards while we're at a continuation byte (0b10xxxxxx)
    while pos > 0 && !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Truncate `&str` to at most `max_bytes`, never splitting a UTF-8 codepoint.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        s
    } else {
        &s[..floor_char_boundary(s, max_bytes)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_str_short() {
        assert_eq!(truncate_str("hunter2", 10), "hunter2");
    }

    #[test]
    fn truncate_str_ascii() {
        assert_eq!(truncate_str("8+ chars: hunter2", 8), "8+ chars");
    }

    #[test]
    fn truncate_str_zero_max() {
        assert_eq!(truncate_str("hunter2", 0), "");
    }

    #[test]
    fn truncate_str_emoji() {
        // Each emoji is 4 bytes
        let s = "\u{1F608}\u{1F923}"; // 8 bytes
        assert_eq!(truncate_str(s, 4), "\u{1F608}");
        assert_eq!(truncate_str(s, 7), "\u{1F608}"); // can't fit partial emoji
    }

    #[test]
    fn truncate_str_accented() {
        let s = "p\u{00e4}ss"; // 'a' with umlaut = 2 bytes, total 5
        assert_eq!(truncate_str(s, 2), "p");
        assert_eq!(truncate_str(s, 3), "p\u{00e4}");
    }
}
