/// Appended to markup cut at the caller's limit
pub const TRUNCATION_MARKER: &str = "\n... [markup truncated]";

/// Cut `markup` to `max_length` characters and append [`TRUNCATION_MARKER`]
///
/// Counts chars, not bytes, so multi-byte text is never split mid-character.
/// Markup within the limit comes back unchanged.
pub fn truncate_markup(markup: &str, max_length: usize) -> String {
    match markup.char_indices().nth(max_length) {
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
            truncated.push_str(&markup[..cut]);
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => markup.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_markup_is_cut_at_limit() {
        let doc = "x".repeat(500);
        let out = truncate_markup(&doc, 100);
        assert_eq!(out, format!("{}{}", "x".repeat(100), TRUNCATION_MARKER));
    }

    #[test]
    fn short_markup_is_untouched() {
        let doc = "y".repeat(50);
        assert_eq!(truncate_markup(&doc, 100), doc);
    }

    #[test]
    fn markup_exactly_at_limit_is_untouched() {
        let doc = "z".repeat(100);
        assert_eq!(truncate_markup(&doc, 100), doc);
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundary() {
        let doc = "é".repeat(10);
        let out = truncate_markup(&doc, 3);
        assert_eq!(out, format!("ééé{}", TRUNCATION_MARKER));
    }
}
