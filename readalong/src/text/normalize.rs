//! Whitespace normalization shared by every segmentation stage.

/// Collapse every run of whitespace (spaces, tabs, newlines) into a single
/// space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for word in text.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }

    result
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_mixed_whitespace() {
        assert_eq!(
            normalize_whitespace("  Hello \t world\n\n  again  "),
            "Hello world again"
        );
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    #[test]
    fn test_non_breaking_space_is_whitespace() {
        assert_eq!(normalize_whitespace("a\u{00a0}\u{00a0}b"), "a b");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_whitespace(" one  two\nthree ");
        assert_eq!(normalize_whitespace(&once), once);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("one two  three"), 3);
        assert_eq!(word_count("   "), 0);
    }
}
