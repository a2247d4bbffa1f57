//! String predicates shared by selector validation and the JS bindings.

/// Returns true if the string has no characters at all.
///
/// ```
/// use domwatch_core::strings::is_empty;
/// assert!(is_empty(""));
/// assert!(!is_empty(" "));
/// ```
#[inline]
pub fn is_empty(s: &str) -> bool {
    s.is_empty()
}

/// Returns true if the string is empty or contains only whitespace.
///
/// ```
/// use domwatch_core::strings::is_blank;
/// assert!(is_blank(""));
/// assert!(is_blank(" \t\n"));
/// assert!(!is_blank(" div "));
/// ```
pub fn is_blank(s: &str) -> bool {
    if is_empty(s) {
        return true;
    }
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank_unicode_whitespace() {
        // U+3000 IDEOGRAPHIC SPACE
        assert!(is_blank("\u{3000}"));
        assert!(!is_blank("\u{3000}a"));
    }
}
