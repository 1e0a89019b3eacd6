/// Trim surrounding whitespace (including a stray `\r` from CRLF exports).
///
/// Quotes are left alone: the export format has no quoting, so a quoted
/// value is just a value that happens to contain quote characters.
pub fn clean_str(raw: &str) -> String {
    raw.trim().to_string()
}

/// True for lines that carry no data at all.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// The legacy-field fallback: `primary` when present and non-empty,
/// otherwise `fallback`, otherwise `""`.
pub fn first_non_empty<'a>(primary: Option<&'a str>, fallback: Option<&'a str>) -> &'a str {
    match primary {
        Some(v) if !v.is_empty() => v,
        _ => fallback.unwrap_or(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_trims_whitespace_and_cr() {
        assert_eq!(clean_str("  Alice \r"), "Alice");
        assert_eq!(clean_str("\"quoted\""), "\"quoted\"");
    }

    #[test]
    fn first_non_empty_prefers_primary() {
        assert_eq!(first_non_empty(Some("clean"), Some("raw")), "clean");
        assert_eq!(first_non_empty(Some(""), Some("raw")), "raw");
        assert_eq!(first_non_empty(None, Some("raw")), "raw");
        assert_eq!(first_non_empty(None, None), "");
    }
}
