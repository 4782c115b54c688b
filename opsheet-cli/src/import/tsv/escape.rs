//! Escaping for values that would break a tab-separated line

/// Escape a value so it contains no raw tab, newline or carriage return
pub fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse of [`escape_field`]. Unknown escapes are kept verbatim.
pub fn unescape_field(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_removes_separators() {
        let escaped = escape_field("a\tb\nc\r\nd");
        assert!(!escaped.contains('\t'));
        assert!(!escaped.contains('\n'));
        assert!(!escaped.contains('\r'));
        assert_eq!(escaped, "a\\tb\\nc\\r\\nd");
    }

    #[test]
    fn test_unescape_restores_value() {
        let original = "path C:\\temp\tcol\nline";
        assert_eq!(unescape_field(&escape_field(original)), original);
    }

    #[test]
    fn test_unknown_escape_is_kept() {
        assert_eq!(unescape_field("50\\% off\\"), "50\\% off\\");
    }
}
