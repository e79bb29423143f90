// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! This module contains HTTP syntax semantics for field names and field
//! values, valid across all representations of HTTP.
//!
//! # References
//! * [RFC 9110](https://www.rfc-editor.org/rfc/rfc9110.html)

use strum_macros::AsRefStr;

use crate::abnf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error, AsRefStr)]
pub enum SyntaxError {
    #[error("contains a delimiter")]
    TokenContainsDelimiter,

    #[error("contains a character that isn't visible ASCII")]
    TokenContainsNonVisibleAscii,

    #[error("contains whitespace")]
    TokenContainsWhitespace,

    #[error("is empty")]
    TokenEmpty,

    #[error("contains a control character")]
    FieldValueContainsInvalidCharacters,

    /// A CR or LF that isn't part of an obsolete line folding.
    ///
    /// ## Examples:
    /// ```text
    /// value\nvalue
    /// value\rvalue
    /// value\r\nvalue
    /// ```
    #[error("contains a line break outside of an obsolete line folding")]
    FieldValueContainsLineBreak,
}

/// Validate a field character. Note that in HTTP, UTF-8 is optional (US-ASCII),
/// and isn't used before validating the content.
///
/// ```text
/// field-vchar    = VCHAR / obs-text
/// ```
///
/// Note that `0xFF` is excluded from obs-text here, as it never occurs in
/// UTF-8 and was historically used to smuggle line breaks.
#[inline]
fn is_field_value_character(byte: u8) -> bool {
    abnf::is_visible_character(byte) || matches!(byte, 0x80..=0xFE)
}

/// Validates a field value. Line breaks are only allowed as an obsolete line
/// folding, i.e. a CRLF immediately followed by a space or a tab.
///
/// ```text
/// field-value    = *field-content
/// field-content  = field-vchar
///                  [ 1*( SP / HTAB / field-vchar ) field-vchar ]
/// obs-fold       = OWS CRLF RWS
/// ```
///
/// # References
/// * [RFC 9110 Section 5.5](https://www.rfc-editor.org/rfc/rfc9110.html#name-field-values)
/// * [RFC 9112 Section 5.2](https://www.rfc-editor.org/rfc/rfc9112.html#name-obsolete-line-folding)
pub fn validate_field_value(value: &str) -> Result<(), SyntaxError> {
    let bytes = value.as_bytes();

    for (index, byte) in bytes.iter().copied().enumerate() {
        match byte {
            b'\r' => {
                let folded = bytes.get(index + 1) == Some(&b'\n')
                    && matches!(bytes.get(index + 2), Some(b' ' | b'\t'));
                if !folded {
                    return Err(SyntaxError::FieldValueContainsLineBreak);
                }
            }
            b'\n' => {
                if index == 0 || bytes[index - 1] != b'\r' {
                    return Err(SyntaxError::FieldValueContainsLineBreak);
                }
            }
            b' ' | b'\t' => (),
            _ if is_field_value_character(byte) => (),
            _ => return Err(SyntaxError::FieldValueContainsInvalidCharacters),
        }
    }

    Ok(())
}

/// Validates a field name, which is a `token`.
///
/// ```text
/// field-name     = token
/// token          = 1*tchar
/// ```
pub fn validate_token(value: &str) -> Result<(), SyntaxError> {
    if value.is_empty() {
        return Err(SyntaxError::TokenEmpty);
    }

    for character in value.bytes() {
        validate_token_character(character)?;
    }

    Ok(())
}

/// Validate a token character.
///
/// ```text
/// tchar          = "!" / "#" / "$" / "%" / "&" / "'" / "*"
///                / "+" / "-" / "." / "^" / "_" / "`" / "|" / "~"
///                / DIGIT / ALPHA
///                ; any VCHAR, except delimiters
/// ```
fn validate_token_character(character: u8) -> Result<(), SyntaxError> {
    match character {
        b' ' | b'\t' => Err(SyntaxError::TokenContainsWhitespace),

        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'^' | b'_' | b'`' | b'|' | b'~' => Ok(()),

        b'0'..=b'9' => Ok(()),
        b'A'..=b'Z' => Ok(()),
        b'a'..=b'z' => Ok(()),

        b'"' | b'(' | b')' | b',' | b'/' | b':' | b';' | b'<' | b'=' | b'>' |
        b'?' | b'@' | b'[' | b'\\' | b']' | b'{' | b'}' => Err(SyntaxError::TokenContainsDelimiter),

        _ => Err(SyntaxError::TokenContainsNonVisibleAscii),
    }
}
