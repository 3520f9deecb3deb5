//! Stable identifiers derived from free text.

/// Derive a key by keeping only ASCII letters, in their original order.
///
/// Case is preserved and no Unicode folding is done, so `"José"` and
/// `"Jose"` produce different keys. Inputs with no ASCII letters produce an
/// empty key.
pub fn derive_key(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_alphabetic()).collect()
}

/// Drop everything outside printable ASCII, keeping whitespace.
///
/// Spreadsheet exports tend to carry smart quotes and zero-width characters
/// that the typesetter chokes on.
pub fn strip_nonprintable(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_graphic() || c.is_ascii_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_keeps_letters_in_order() {
        assert_eq!(derive_key("Jane O'Neil-2nd"), "JaneONeilnd");
        assert_eq!(derive_key("Group Numbers [Opening]"), "GroupNumbersOpening");
    }

    #[test]
    fn test_derive_key_preserves_case() {
        assert_eq!(derive_key("ABC abc"), "ABCabc");
        assert_ne!(derive_key("Abc"), derive_key("abc"));
    }

    #[test]
    fn test_derive_key_empty_inputs() {
        assert_eq!(derive_key(""), "");
        assert_eq!(derive_key("123 - 456!"), "");
    }

    #[test]
    fn test_derive_key_drops_non_ascii_letters() {
        assert_eq!(derive_key("Zoë Müller"), "ZoMller");
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let input = "Mary_Kate Smith";
        assert_eq!(derive_key(input), derive_key(input));
        assert_eq!(derive_key(input), "MaryKateSmith");
    }

    #[test]
    fn test_strip_nonprintable() {
        assert_eq!(strip_nonprintable("It\u{2019}s a \u{201c}show\u{201d}"), "Its a show");
        assert_eq!(strip_nonprintable("line one\nline two"), "line one\nline two");
    }
}
