// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Percent-encoding of URI components. Existing `pct-encoded` triplets are
//! left as they are, so filtering an already encoded component is a no-op.
//!
//! # References
//! * [RFC 3986 Section 2.1. Percent-Encoding](https://www.rfc-editor.org/rfc/rfc3986.html#section-2.1)

use std::{
    borrow::Cow,
    fmt::Write,
};

use crate::abnf;

/// The component being encoded, which determines the characters that may
/// appear unencoded in addition to `unreserved` and `sub-delims`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Component {
    /// ```text
    /// userinfo      = *( unreserved / pct-encoded / sub-delims / ":" )
    /// ```
    UserInfo,

    /// The user part of the user information, which can't contain a colon
    /// since that separates it from the password.
    User,

    /// ```text
    /// segment       = *pchar
    /// pchar         = unreserved / pct-encoded / sub-delims / ":" / "@"
    /// ```
    Path,

    /// ```text
    /// query         = *( pchar / "/" / "?" )
    /// fragment      = *( pchar / "/" / "?" )
    /// ```
    QueryOrFragment,
}

impl Component {
    fn allows(&self, byte: u8) -> bool {
        if abnf::is_unreserved(byte) || abnf::is_sub_delimiter(byte) {
            return true;
        }

        match self {
            Self::UserInfo => byte == b':',
            Self::User => false,
            Self::Path => matches!(byte, b':' | b'@' | b'/'),
            Self::QueryOrFragment => matches!(byte, b':' | b'@' | b'/' | b'?'),
        }
    }
}

/// Percent-encodes every byte the component doesn't allow. A `%` is only
/// encoded when it isn't followed by two hexadecimal digits.
pub(crate) fn percent_encode(input: &str, component: Component) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    let needs_encoding = bytes.iter().enumerate().any(|(index, byte)| {
        if *byte == b'%' {
            !abnf::starts_with_percent_encoding(&bytes[index..])
        } else {
            !component.allows(*byte)
        }
    });

    if !needs_encoding {
        return Cow::Borrowed(input);
    }

    let mut output = String::with_capacity(input.len() + 8);
    for (index, byte) in bytes.iter().copied().enumerate() {
        let keep = if byte == b'%' {
            abnf::starts_with_percent_encoding(&bytes[index..])
        } else {
            component.allows(byte)
        };

        if keep {
            output.push(byte as char);
        } else {
            _ = write!(output, "%{byte:02X}");
        }
    }

    Cow::Owned(output)
}

/// Filters a path, collapsing multiple leading slashes into one.
pub(crate) fn filter_path(path: &str) -> String {
    let path = percent_encode(path, Component::Path);
    if path.starts_with('/') {
        return format!("/{}", path.trim_start_matches('/'));
    }
    path.into_owned()
}

/// Filters a query string, encoding each key and value separately.
pub(crate) fn filter_query(query: &str) -> String {
    let query = query.strip_prefix('?').unwrap_or(query);

    query.split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => format!(
                "{}={}",
                percent_encode(key, Component::QueryOrFragment),
                percent_encode(value, Component::QueryOrFragment),
            ),
            None => percent_encode(pair, Component::QueryOrFragment).into_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

pub(crate) fn filter_fragment(fragment: &str) -> String {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    percent_encode(fragment, Component::QueryOrFragment).into_owned()
}
