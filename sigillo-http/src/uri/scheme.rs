// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use phf::phf_map;

use crate::InvalidArgument;

/// Well-known ports of the supported schemes. A scheme is supported exactly
/// when it has an entry in this table.
static DEFAULT_PORTS: phf::Map<&'static str, u16> = phf_map!(
    "http" => 80,
    "https" => 443,
    "smtp" => 25,
    "imap" => 143,
    "pop" => 110,
    "ftp" => 21,
    "ftps" => 990,
    "sftp" => 22,
    "ssh" => 22,
    "telnet" => 23,
    "snmp" => 161,
    "dns" => 53,
    "gopher" => 70,
    "ldap" => 389,
    "ldaps" => 636,
    "sip" => 5060,
    "sips" => 5061,
    "nntp" => 119,
    "news" => 119,
    "nntps" => 563,
    "ws" => 80,
    "wss" => 443,
);

/// The port implied by the scheme, e.g. `443` for `https`.
#[must_use]
pub fn default_port(scheme: &str) -> Option<u16> {
    DEFAULT_PORTS.get(scheme).copied()
}

#[must_use]
pub fn is_supported_scheme(scheme: &str) -> bool {
    DEFAULT_PORTS.contains_key(scheme)
}

/// Normalizes a scheme to lowercase, stripping a trailing `:` or `://`.
///
/// ```text
/// scheme        = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
/// ```
///
/// The empty scheme is accepted and means "no scheme".
pub(crate) fn filter_scheme(scheme: &str) -> Result<String, InvalidArgument> {
    let mut scheme = scheme.to_ascii_lowercase();
    let stripped_length = scheme.strip_suffix("://")
        .or_else(|| scheme.strip_suffix(':'))
        .map(str::len);
    if let Some(length) = stripped_length {
        scheme.truncate(length);
    }

    if scheme.is_empty() {
        return Ok(scheme);
    }

    let bytes = scheme.as_bytes();
    let well_formed = bytes.len() >= 2
        && bytes[0].is_ascii_lowercase()
        && bytes[1..].iter().all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || matches!(byte, b'+' | b'-' | b'.'));
    if !well_formed {
        return Err(InvalidArgument::Scheme(scheme));
    }

    if !is_supported_scheme(&scheme) {
        return Err(InvalidArgument::UnsupportedScheme(scheme));
    }

    Ok(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http", Ok("http"))]
    #[case("HTTPS", Ok("https"))]
    #[case("http:", Ok("http"))]
    #[case("https://", Ok("https"))]
    #[case("", Ok(""))]
    #[case("h", Err(InvalidArgument::Scheme("h".into())))]
    #[case("1http", Err(InvalidArgument::Scheme("1http".into())))]
    #[case("ht tp", Err(InvalidArgument::Scheme("ht tp".into())))]
    #[case("git+ssh", Err(InvalidArgument::UnsupportedScheme("git+ssh".into())))]
    #[case("mailto", Err(InvalidArgument::UnsupportedScheme("mailto".into())))]
    fn test_filter_scheme(#[case] input: &str, #[case] expected: Result<&str, InvalidArgument>) {
        assert_eq!(filter_scheme(input), expected.map(String::from));
    }

    #[rstest]
    #[case("http", Some(80))]
    #[case("https", Some(443))]
    #[case("ftp", Some(21))]
    #[case("ssh", Some(22))]
    #[case("unknown", None)]
    fn test_default_port(#[case] scheme: &str, #[case] expected: Option<u16>) {
        assert_eq!(default_port(scheme), expected);
    }
}
