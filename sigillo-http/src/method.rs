// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    fmt,
    str::FromStr,
};

use phf::phf_map;

use crate::InvalidArgument;

/// The methods a request may carry. Any other method is refused.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl Method {
    /// Get the method in string form.
    ///
    /// # Notes
    /// Method names are case-sensitive, as per
    /// [RFC 9110 - Section 9.1](https://www.rfc-editor.org/rfc/rfc9110.html#section-9.1-5):
    /// > The method token is case-sensitive because it might be used as a
    /// > gateway to object-based systems with case-sensitive method names. By
    /// > convention, standardized methods are defined in all-uppercase US-ASCII
    /// > letters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

static METHOD_MAP: phf::Map<&'static str, Method> = phf_map!(
    "GET" => Method::Get,
    "POST" => Method::Post,
    "PUT" => Method::Put,
    "PATCH" => Method::Patch,
    "DELETE" => Method::Delete,
    "HEAD" => Method::Head,
    "OPTIONS" => Method::Options,
    "TRACE" => Method::Trace,
);

impl FromStr for Method {
    type Err = InvalidArgument;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        METHOD_MAP.get(value)
            .copied()
            .ok_or_else(|| InvalidArgument::Method(value.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("GET", Ok(Method::Get))]
    #[case("POST", Ok(Method::Post))]
    #[case("PUT", Ok(Method::Put))]
    #[case("PATCH", Ok(Method::Patch))]
    #[case("DELETE", Ok(Method::Delete))]
    #[case("HEAD", Ok(Method::Head))]
    #[case("OPTIONS", Ok(Method::Options))]
    #[case("TRACE", Ok(Method::Trace))]
    #[case("get", Err(InvalidArgument::Method("get".into())))]
    #[case("CONNECT", Err(InvalidArgument::Method("CONNECT".into())))]
    #[case("FOO", Err(InvalidArgument::Method("FOO".into())))]
    #[case("", Err(InvalidArgument::Method(String::new())))]
    fn test_parse(#[case] input: &str, #[case] expected: Result<Method, InvalidArgument>) {
        assert_eq!(input.parse::<Method>(), expected);
    }

    #[test]
    fn as_str_round_trips() {
        for (name, method) in METHOD_MAP.entries() {
            assert_eq!(method.as_str(), *name);
        }
    }
}
