//! Escaping of reserved characters in Tiny-V2 name fields.
//!
//! Backslash, newline, carriage return, tab and NUL would corrupt the
//! line/column structure of the format and are written as two-character
//! escape sequences.

use weft_core::{Result, WeftError};

/// Escape reserved characters in a name. Returns the input unchanged when
/// nothing needs escaping.
pub fn escape(s: &str) -> String {
    if !s.chars().any(|c| matches!(c, '\\' | '\n' | '\r' | '\t' | '\0')) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`escape`]. `line` is only used for error reporting.
pub fn unescape(s: &str, line: usize) -> Result<String> {
    if !s.contains('\\') {
        return Ok(s.to_string());
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            other => {
                return Err(WeftError::format(
                    line,
                    format!("invalid escape sequence '\\{}'", other.map(String::from).unwrap_or_default()),
                ))
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_string_unchanged() {
        assert_eq!(escape("foo/Bar"), "foo/Bar");
        assert_eq!(unescape("foo/Bar", 1).unwrap(), "foo/Bar");
    }

    #[test]
    fn test_escape_all_reserved() {
        assert_eq!(escape("a\\b\nc\td\0e\rf"), "a\\\\b\\nc\\td\\0e\\rf");
    }

    #[test]
    fn test_roundtrip() {
        let original = "weird\\name\twith\nstuff";
        assert_eq!(unescape(&escape(original), 1).unwrap(), original);
    }

    #[test]
    fn test_invalid_escape_fails() {
        assert!(unescape("bad\\q", 5).is_err());
        assert!(unescape("trailing\\", 5).is_err());
    }
}
