// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use hashbrown::HashMap;
use unicase::UniCase;

use crate::{
    syntax,
    InvalidArgument,
};

/// The header fields of a message.
///
/// Names are matched case-insensitively, but the case in which a name was
/// first provided is preserved and used when the headers are listed. The
/// fields are kept in the order in which they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMap {
    /// Case-insensitive name to the name as it is stored in `entries`.
    names: HashMap<UniCase<String>, String>,
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMap {
    pub fn new() -> HeaderMap {
        HeaderMap::default()
    }

    #[must_use]
    pub fn contains(&self, header_name: &str) -> bool {
        self.names.contains_key(&key(header_name))
    }

    /// Returns the values of the given header, or an empty slice if the
    /// header isn't present.
    #[must_use]
    pub fn get(&self, header_name: &str) -> &[String] {
        match self.position(header_name) {
            Some(index) => &self.entries[index].1,
            None => &[],
        }
    }

    /// Returns the values of the given header joined by a comma, or the empty
    /// string if the header isn't present.
    #[must_use]
    pub fn get_line(&self, header_name: &str) -> String {
        self.get(header_name).join(", ")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the header names, in the case they were provided, and
    /// their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Appends the values to the header, creating it if it doesn't exist yet.
    pub(crate) fn append(&mut self, header_name: &str, values: Vec<String>) -> Result<(), InvalidArgument> {
        validate(header_name, &values)?;
        self.append_unchecked(header_name, values);
        Ok(())
    }

    /// Replaces all values of the header. The header is moved to the end and
    /// takes on the case of `header_name`.
    pub(crate) fn replace(&mut self, header_name: &str, values: Vec<String>) -> Result<(), InvalidArgument> {
        validate(header_name, &values)?;
        self.replace_unchecked(header_name, values);
        Ok(())
    }

    /// Replaces the header with values that are known to be valid, for
    /// example a `Host` derived from an already validated URI.
    pub(crate) fn replace_unchecked(&mut self, header_name: &str, values: Vec<String>) {
        self.remove(header_name);
        self.append_unchecked(header_name, values);
    }

    pub(crate) fn remove(&mut self, header_name: &str) {
        if let Some(name) = self.names.remove(&key(header_name)) {
            self.entries.retain(|(existing, _)| existing != &name);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.names.clear();
        self.entries.clear();
    }

    fn append_unchecked(&mut self, header_name: &str, mut values: Vec<String>) {
        if let Some(index) = self.position(header_name) {
            self.entries[index].1.append(&mut values);
            return;
        }

        self.names.insert(key(header_name), header_name.to_string());
        self.entries.push((header_name.to_string(), values));
    }

    fn position(&self, header_name: &str) -> Option<usize> {
        let name = self.names.get(&key(header_name))?;
        self.entries.iter().position(|(existing, _)| existing == name)
    }
}

fn key(header_name: &str) -> UniCase<String> {
    UniCase::ascii(header_name.to_string())
}

fn validate(header_name: &str, values: &[String]) -> Result<(), InvalidArgument> {
    syntax::validate_token(header_name)
        .map_err(|reason| InvalidArgument::HeaderName { name: header_name.to_string(), reason })?;

    if values.is_empty() {
        return Err(InvalidArgument::EmptyHeaderValues(header_name.to_string()));
    }

    for value in values {
        syntax::validate_field_value(value)
            .map_err(|reason| InvalidArgument::HeaderValue { value: value.clone(), reason })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxError;
    use rstest::rstest;

    fn values(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn lookup_is_case_insensitive_and_preserves_case() {
        let mut map = HeaderMap::new();
        map.append("Content-Type", values(&["text/html"])).unwrap();

        assert!(map.contains("content-type"));
        assert!(map.contains("CONTENT-TYPE"));
        assert_eq!(map.get("cOnTeNt-TyPe"), ["text/html"]);
        assert_eq!(map.names().collect::<Vec<_>>(), ["Content-Type"]);
    }

    #[test]
    fn append_keeps_first_casing_and_order() {
        let mut map = HeaderMap::new();
        map.append("Accept", values(&["text/html"])).unwrap();
        map.append("X-Trace", values(&["1"])).unwrap();
        map.append("ACCEPT", values(&["application/json", "*/*"])).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("accept"), ["text/html", "application/json", "*/*"]);
        assert_eq!(map.get_line("accept"), "text/html, application/json, */*");
        assert_eq!(map.names().collect::<Vec<_>>(), ["Accept", "X-Trace"]);
    }

    #[test]
    fn replace_takes_new_casing() {
        let mut map = HeaderMap::new();
        map.append("x-request-id", values(&["a"])).unwrap();
        map.append("Accept", values(&["*/*"])).unwrap();
        map.replace("X-Request-ID", values(&["b"])).unwrap();

        assert_eq!(map.get("x-request-id"), ["b"]);
        assert_eq!(map.names().collect::<Vec<_>>(), ["Accept", "X-Request-ID"]);
    }

    #[test]
    fn remove_clears_both_indices() {
        let mut map = HeaderMap::new();
        map.append("Accept", values(&["*/*"])).unwrap();
        map.remove("ACCEPT");
        map.remove("not-present");

        assert!(map.is_empty());
        assert!(!map.contains("accept"));
        assert!(map.get("accept").is_empty());
        assert_eq!(map.get_line("accept"), "");
    }

    #[rstest]
    #[case("", "value", "HeaderName")]
    #[case("Bad Name", "value", "HeaderName")]
    #[case("Bad:Name", "value", "HeaderName")]
    #[case("X-Ok", "bad\nvalue", "HeaderValue")]
    #[case("X-Ok", "bad\rvalue", "HeaderValue")]
    #[case("X-Ok", "nul\0", "HeaderValue")]
    fn invalid_input_leaves_map_untouched(#[case] name: &str, #[case] value: &str, #[case] kind: &str) {
        let mut map = HeaderMap::new();
        map.append("X-Ok", values(&["original"])).unwrap();
        let before = map.clone();

        let error = map.append(name, values(&[value])).unwrap_err();
        assert_eq!(error.as_ref(), kind);
        assert_eq!(map, before);
    }

    #[rstest]
    #[case("Bad Name", "value", InvalidArgument::HeaderName { name: "Bad Name".into(), reason: SyntaxError::TokenContainsWhitespace })]
    #[case("Bad:Name", "value", InvalidArgument::HeaderName { name: "Bad:Name".into(), reason: SyntaxError::TokenContainsDelimiter })]
    #[case("", "value", InvalidArgument::HeaderName { name: "".into(), reason: SyntaxError::TokenEmpty })]
    #[case("X-Ok", "bad\nvalue", InvalidArgument::HeaderValue { value: "bad\nvalue".into(), reason: SyntaxError::FieldValueContainsLineBreak })]
    #[case("X-Ok", "nul\0", InvalidArgument::HeaderValue { value: "nul\0".into(), reason: SyntaxError::FieldValueContainsInvalidCharacters })]
    fn errors_name_the_violated_rule(#[case] name: &str, #[case] value: &str, #[case] expected: InvalidArgument) {
        let mut map = HeaderMap::new();
        assert_eq!(map.append(name, values(&[value])), Err(expected));
    }

    #[test]
    fn empty_value_list_is_rejected() {
        let mut map = HeaderMap::new();
        assert_eq!(
            map.append("X-Empty", Vec::new()),
            Err(InvalidArgument::EmptyHeaderValues("X-Empty".into()))
        );
    }
}
