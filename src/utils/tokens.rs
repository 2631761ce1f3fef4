//! Token estimation

/// Estimate tokens from a character count (chars / 4, rounded up).
///
/// Counts Unicode code points, not bytes, so multi-byte UTF-8 content
/// (CJK text, emoji) is not over-counted.
pub fn estimate_tokens_for_chars(char_count: usize) -> usize {
    char_count.div_ceil(4)
}

pub fn estimate_tokens(text: &str) -> usize {
    estimate_tokens_for_chars(text.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_partial_tokens_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn counts_code_points_not_bytes() {
        assert_eq!(estimate_tokens("日本語です"), 2);
    }
}
