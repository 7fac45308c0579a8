//! Text comparison rules shared by the strategies and the page-state accessor

/// Collapse runs of whitespace to one space and trim the ends
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive substring match on normalized text
///
/// An empty needle never matches.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = normalize(needle).to_lowercase();
    if needle.is_empty() {
        return false;
    }
    normalize(haystack).to_lowercase().contains(&needle)
}

/// Anchored, case-insensitive match on normalized text
pub fn equals_ignore_case(text: &str, target: &str) -> bool {
    let target = normalize(target);
    !target.is_empty() && normalize(text).to_lowercase() == target.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_ignores_case_and_spacing() {
        assert!(contains_ignore_case("Submit  form", "submit"));
        assert!(contains_ignore_case("  Sign\nIn ", "sign in"));
        assert!(!contains_ignore_case("Cancel", "submit"));
    }

    #[test]
    fn empty_needle_never_matches() {
        assert!(!contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("anything", "   "));
        assert!(!equals_ignore_case("", ""));
    }

    #[test]
    fn exact_match_is_anchored() {
        assert!(equals_ignore_case("  SUBMIT ", "submit"));
        assert!(!equals_ignore_case("Submit form", "submit"));
    }
}
