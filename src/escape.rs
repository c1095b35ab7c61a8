//! String literal escaping.
//!
//! Maps control and quote characters to their backslash sequences so the
//! text can sit between single quotes.

use std::borrow::Cow;

/// Escape sequence for a character, if it needs one.
fn escape_sequence(c: char) -> Option<&'static str> {
    match c {
        '\0' => Some("\\0"),
        '\x08' => Some("\\b"),
        '\t' => Some("\\t"),
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        '\'' => Some("\\'"),
        '\\' => Some("\\\\"),
        '"' => Some("\\\""),
        '\x1a' => Some("\\Z"),
        _ => None,
    }
}

/// Escape `val` for use inside a single-quoted SQL literal.
///
/// Scans once. When nothing needs escaping the input is returned borrowed.
///
/// # Example
///
/// ```
/// use sql_stringify::escape_string;
///
/// assert_eq!(escape_string("plain"), "plain");
/// assert_eq!(escape_string("O'Brien"), "O\\'Brien");
/// ```
pub fn escape_string(val: &str) -> Cow<'_, str> {
    let mut escaped = String::new();
    let mut chunk_start = 0;

    for (idx, c) in val.char_indices() {
        if let Some(seq) = escape_sequence(c) {
            escaped.push_str(&val[chunk_start..idx]);
            escaped.push_str(seq);
            chunk_start = idx + c.len_utf8();
        }
    }

    if chunk_start == 0 {
        return Cow::Borrowed(val);
    }

    escaped.push_str(&val[chunk_start..]);
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nothing_to_escape_borrows() {
        assert!(matches!(escape_string("hello world"), Cow::Borrowed(_)));
        assert!(matches!(escape_string(""), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_map() {
        assert_eq!(escape_string("\0"), "\\0");
        assert_eq!(escape_string("\x08"), "\\b");
        assert_eq!(escape_string("\t"), "\\t");
        assert_eq!(escape_string("\n"), "\\n");
        assert_eq!(escape_string("\r"), "\\r");
        assert_eq!(escape_string("'"), "\\'");
        assert_eq!(escape_string("\\"), "\\\\");
        assert_eq!(escape_string("\""), "\\\"");
        assert_eq!(escape_string("\x1a"), "\\Z");
    }

    #[test]
    fn test_escape_keeps_surrounding_text() {
        assert_eq!(escape_string("it's a \"test\"\n"), "it\\'s a \\\"test\\\"\\n");
        assert_eq!(escape_string("'leading"), "\\'leading");
        assert_eq!(escape_string("trailing'"), "trailing\\'");
    }

    #[test]
    fn test_escape_multibyte() {
        assert_eq!(escape_string("Đà Nẵng'"), "Đà Nẵng\\'");
        assert_eq!(escape_string("Việt Nam(*)"), "Việt Nam(*)");
    }
}
