// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Various Augmented BNF (ABNF) tools and utilities, shared by the HTTP field
//! syntax and the URI grammar.
//!
//! # Ranges
//! Ranges are inclusive:
//! ```text
//! DIGIT       =  %x30-39
//! ```
//! is equivalent to:
//! ```text
//! DIGIT       =  "0" / "1" / "2" / "3" / "4" / "5" / "6" /
//!                "7" / "8" / "9"
//! ```
//!
//! # References
//! * [RFC 5234 Augmented BNF for Syntax Specifications: ABNF](https://www.rfc-editor.org/rfc/rfc5234.html)
//! * [RFC 3986 Section 2. Characters](https://www.rfc-editor.org/rfc/rfc3986.html#section-2)

/// Is the character a visible (printing) character.
///
/// ```text
/// VCHAR          =  %x21-7E
/// ```
#[inline]
pub fn is_visible_character(byte: u8) -> bool {
    matches!(byte, 0x21..=0x7E)
}

/// ```text
/// HEXDIG         =  DIGIT / "A" / "B" / "C" / "D" / "E" / "F"
/// ```
///
/// Lowercase hexadecimal digits are accepted as well, as RFC 3986 states that
/// percent-encodings are case-insensitive.
#[inline]
pub fn is_hex_digit(byte: u8) -> bool {
    byte.is_ascii_hexdigit()
}

/// ```text
/// unreserved    = ALPHA / DIGIT / "-" / "." / "_" / "~"
/// ```
#[inline]
pub fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// ```text
/// sub-delims    = "!" / "$" / "&" / "'" / "(" / ")"
///               / "*" / "+" / "," / ";" / "="
/// ```
#[inline]
pub fn is_sub_delimiter(byte: u8) -> bool {
    matches!(byte, b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=')
}

/// Returns whether `input` starts with a `pct-encoded` triplet.
///
/// ```text
/// pct-encoded   = "%" HEXDIG HEXDIG
/// ```
#[inline]
pub fn starts_with_percent_encoding(input: &[u8]) -> bool {
    matches!(input, [b'%', high, low, ..] if is_hex_digit(*high) && is_hex_digit(*low))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b'!', true)]
    #[case(b'0', true)]
    #[case(b'9', true)]
    #[case(b'a', true)]
    #[case(b'z', true)]
    #[case(b'A', true)]
    #[case(b' ', false)]
    #[case(b'\t', false)]
    #[case(b'\r', false)]
    #[case(b'\n', false)]
    #[case(b'~', true)]
    #[case(0x00, false)]
    #[case(0x1F, false)]
    #[case(0x7F, false)]
    fn test_is_visible_character(#[case] character: u8, #[case] expected: bool) {
        assert_eq!(is_visible_character(character), expected);
    }

    #[rstest]
    #[case(b'a', true)]
    #[case(b'Z', true)]
    #[case(b'5', true)]
    #[case(b'-', true)]
    #[case(b'.', true)]
    #[case(b'_', true)]
    #[case(b'~', true)]
    #[case(b'!', false)]
    #[case(b'%', false)]
    #[case(b'/', false)]
    #[case(0xC3, false)]
    fn test_is_unreserved(#[case] character: u8, #[case] expected: bool) {
        assert_eq!(is_unreserved(character), expected);
    }

    #[rstest]
    #[case(b"%20", true)]
    #[case(b"%aF", true)]
    #[case(b"%2", false)]
    #[case(b"%zz", false)]
    #[case(b"%", false)]
    #[case(b"20", false)]
    #[case(b"%41abc", true)]
    fn test_starts_with_percent_encoding(#[case] input: &[u8], #[case] expected: bool) {
        assert_eq!(starts_with_percent_encoding(input), expected);
    }
}
