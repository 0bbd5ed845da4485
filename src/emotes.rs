//! Emote identifiers that tend to come up when prompting users for reactions. These can be used
//! instead of raw unicode literals when building waiters.

/// Thumbs up, code point U+1F44D
pub const THUMBS_UP: &str = "\u{1F44D}";

/// Thumbs down, code point U+1F44E
pub const THUMBS_DOWN: &str = "\u{1F44E}";

/// Star, code point U+2B50
pub const STAR: &str = "\u{2B50}";

/// Check mark, code point U+2705
pub const CHECK_MARK: &str = "\u{2705}";

/// Cross mark, code point U+274C
pub const CROSS_MARK: &str = "\u{274C}";

/// Digit 1, code point U+0031
pub const ONE: &str = "\u{0031}";

/// Digit 2, code point U+0032
pub const TWO: &str = "\u{0032}";

/// Digit 3, code point U+0033
pub const THREE: &str = "\u{0033}";

/// Triangular flag on post, code point U+1F6A9
pub const FLAG: &str = "\u{1F6A9}";

/// Returns the digit emote for the given zero-based index. Useful when laying out a small
/// numbered choice menu. Only indexes 0 through 2 have an emote.
pub fn digit(index: usize) -> Option<&'static str> {
    match index {
        0 => Some(ONE),
        1 => Some(TWO),
        2 => Some(THREE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_the_first_three_numbers() {
        assert_eq!(digit(0), Some("1"));
        assert_eq!(digit(1), Some("2"));
        assert_eq!(digit(2), Some("3"));
        assert_eq!(digit(3), None);
    }
}
