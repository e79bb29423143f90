// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    borrow::Cow,
    sync::Arc,
};

use hashbrown::HashMap;

use crate::{
    Error,
    HttpMessage,
    HttpRequest,
    InvalidArgument,
    Message,
    Request,
    UploadedFile,
    Value,
    ValueMap,
};

/// A request as received by a server, together with the environment it was
/// received in and the values derived from it.
#[derive(Clone, Debug, Default)]
pub struct ServerRequest {
    request: Request,
    server_params: Arc<ValueMap>,
    cookies: HashMap<String, String>,
    query: ValueMap,
    uploaded_files: HashMap<String, Arc<UploadedFile>>,
    parsed_body: Option<Value>,
    attributes: ValueMap,
}

impl ServerRequest {
    /// Wraps the request without deriving anything from it.
    pub fn new(server_params: ValueMap, request: Request) -> Self {
        Self {
            request,
            server_params: Arc::new(server_params),
            ..Default::default()
        }
    }

    /// Wraps the request, decoding the query parameters from its URI and the
    /// cookies from its `Cookie` headers.
    pub fn from_request(server_params: ValueMap, request: Request) -> Self {
        let query = parse_query(request.uri().query());
        let cookies = parse_cookies(request.header("Cookie"));

        Self {
            cookies,
            query,
            ..Self::new(server_params, request)
        }
    }

    /// The read-only environment of the server.
    #[must_use]
    pub fn server_params(&self) -> &ValueMap {
        &self.server_params
    }

    #[must_use]
    pub fn cookie_params(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    #[must_use]
    pub fn with_cookie_params(&self, cookies: HashMap<String, String>) -> Self {
        let mut new = self.clone();
        new.cookies = cookies;
        new
    }

    #[must_use]
    pub fn query_params(&self) -> &ValueMap {
        &self.query
    }

    /// Replaces the query parameters. The URI is left as it is.
    #[must_use]
    pub fn with_query_params(&self, query: ValueMap) -> Self {
        let mut new = self.clone();
        new.query = query;
        new
    }

    #[must_use]
    pub fn uploaded_files(&self) -> &HashMap<String, Arc<UploadedFile>> {
        &self.uploaded_files
    }

    #[must_use]
    pub fn with_uploaded_files(&self, uploaded_files: HashMap<String, Arc<UploadedFile>>) -> Self {
        let mut new = self.clone();
        new.uploaded_files = uploaded_files;
        new
    }

    #[must_use]
    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    /// Sets the deserialized body. Only the absence of a body, a list, a map
    /// or an opaque object is accepted; [`Value::Null`] counts as absent.
    pub fn with_parsed_body(&self, parsed_body: Option<Value>) -> Result<Self, Error> {
        let parsed_body = match parsed_body {
            None | Some(Value::Null) => None,
            Some(value @ (Value::List(..) | Value::Map(..) | Value::Opaque(..))) => Some(value),
            Some(other) => return Err(InvalidArgument::ParsedBodyType(other.type_name()).into()),
        };

        let mut new = self.clone();
        new.parsed_body = parsed_body;
        Ok(new)
    }

    #[must_use]
    pub fn attributes(&self) -> &ValueMap {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    #[must_use]
    pub fn with_attribute(&self, name: &str, value: impl Into<Value>) -> Self {
        let mut new = self.clone();
        new.attributes.insert(name.to_string(), value.into());
        new
    }

    #[must_use]
    pub fn without_attribute(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.attributes.remove(name);
        new
    }
}

impl HttpMessage for ServerRequest {
    fn message(&self) -> &Message {
        &self.request.message
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.request.message
    }
}

impl HttpRequest for ServerRequest {
    fn request(&self) -> &Request {
        &self.request
    }

    fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }
}

/// Decodes a form component, where `+` stands for a space. Invalid UTF-8 is
/// replaced rather than rejected.
fn decode_component(input: &str) -> String {
    let input = if input.contains('+') {
        Cow::Owned(input.replace('+', " "))
    } else {
        Cow::Borrowed(input)
    };

    String::from_utf8_lossy(&urlencoding::decode_binary(input.as_bytes())).into_owned()
}

/// Parses `a=1&b=2` into a map. A key ending in `[]`, or one that occurs
/// more than once, collects its values into a [`Value::List`].
fn parse_query(query: &str) -> ValueMap {
    let mut params = ValueMap::new();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let mut key = decode_component(key);
        let value = Value::String(decode_component(value));

        let is_list = key.ends_with("[]");
        if is_list {
            key.truncate(key.len() - 2);
        }

        if key.is_empty() {
            continue;
        }

        match params.get_mut(&key) {
            Some(Value::List(values)) => values.push(value),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Value::List(vec![first, value]);
            }
            None if is_list => {
                params.insert(key, Value::List(vec![value]));
            }
            None => {
                params.insert(key, value);
            }
        }
    }

    params
}

/// Parses `Cookie` header lines of the form `a=1; b=2`. The first occurrence
/// of a name wins.
fn parse_cookies(lines: &[String]) -> HashMap<String, String> {
    let mut cookies = HashMap::new();

    for line in lines {
        for pair in line.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };

            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let value = value.trim().trim_matches('"');
            cookies.entry(name.to_string())
                .or_insert_with(|| decode_component(value));
        }
    }

    cookies
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::{Method, Uri};

    fn server_request(uri: &str) -> ServerRequest {
        let request = Request::new(Method::Get, Uri::parse(uri).unwrap());
        ServerRequest::from_request(ValueMap::new(), request)
    }

    #[rstest]
    #[case("", &[])]
    #[case("a=1", &[("a", "1")])]
    #[case("a=1&b=two+words", &[("a", "1"), ("b", "two words")])]
    #[case("name=Jane%20Doe&flag", &[("name", "Jane Doe"), ("flag", "")])]
    #[case("&&x=%26&", &[("x", "&")])]
    #[case("=orphan", &[])]
    fn test_parse_query(#[case] query: &str, #[case] expected: &[(&str, &str)]) {
        let params = parse_query(query);
        assert_eq!(params.len(), expected.len());
        for (key, value) in expected {
            assert_eq!(params.get(*key), Some(&Value::from(*value)), "{key}");
        }
    }

    #[test]
    fn repeated_query_keys_collect_into_a_list() {
        let params = parse_query("tag=a&tag=b&tag=c&list[]=x&single=1");
        assert_eq!(params["tag"], Value::from(vec![Value::from("a"), Value::from("b"), Value::from("c")]));
        assert_eq!(params["list"], Value::from(vec![Value::from("x")]));
        assert_eq!(params["single"], Value::from("1"));
    }

    #[rstest]
    #[case(&["a=1; b=2"], &[("a", "1"), ("b", "2")])]
    #[case(&["a=1", "a=2; c=3"], &[("a", "1"), ("c", "3")])]
    #[case(&["quoted=\"v\"; spaced = x%20y "], &[("quoted", "v"), ("spaced", "x y")])]
    #[case(&["novalue; =empty; ok=1"], &[("ok", "1")])]
    fn test_parse_cookies(#[case] lines: &[&str], #[case] expected: &[(&str, &str)]) {
        let lines: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
        let cookies = parse_cookies(&lines);
        assert_eq!(cookies.len(), expected.len());
        for (name, value) in expected {
            assert_eq!(cookies.get(*name).map(String::as_str), Some(*value));
        }
    }

    #[test]
    fn from_request_derives_query_and_cookies() {
        let request = Request::new(Method::Get, Uri::parse("http://example.com/?page=2").unwrap())
            .with_header("Cookie", "session=abc").unwrap();

        let mut params = ValueMap::new();
        params.insert("REMOTE_ADDR".into(), "127.0.0.1".into());

        let server_request = ServerRequest::from_request(params, request);
        assert_eq!(server_request.query_params()["page"], Value::from("2"));
        assert_eq!(server_request.cookie_params()["session"], "abc");
        assert_eq!(server_request.server_params()["REMOTE_ADDR"].as_str(), Some("127.0.0.1"));
        assert_eq!(server_request.header_line("host"), "example.com");
    }

    #[test]
    fn attributes_are_copy_on_write() {
        let original = server_request("http://example.com/");
        let with = original.with_attribute("user", "jane").with_attribute("id", 7);

        assert!(original.attribute("user").is_none());
        assert_eq!(with.attribute("user"), Some(&Value::from("jane")));
        assert_eq!(with.attribute("id").and_then(Value::as_i64), Some(7));

        let without = with.without_attribute("user").without_attribute("missing");
        assert!(without.attribute("user").is_none());
        assert_eq!(without.attributes().len(), 1);
        assert_eq!(with.attributes().len(), 2);
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(Value::Null), true)]
    #[case(Some(Value::List(Vec::new())), true)]
    #[case(Some(Value::Map(ValueMap::new())), true)]
    #[case(Some(Value::opaque(42u8)), true)]
    #[case(Some(Value::from("text")), false)]
    #[case(Some(Value::from(1)), false)]
    #[case(Some(Value::from(false)), false)]
    fn test_with_parsed_body(#[case] body: Option<Value>, #[case] accepted: bool) {
        let result = server_request("/").with_parsed_body(body);
        match accepted {
            true => assert!(result.is_ok()),
            false => assert_eq!(result.unwrap_err().kind(), "ParsedBodyType"),
        }
    }

    #[test]
    fn with_replacements_keep_the_original() {
        let original = server_request("http://example.com/?a=1");

        let mut cookies = HashMap::new();
        cookies.insert(String::from("k"), String::from("v"));
        let changed = original
            .with_cookie_params(cookies)
            .with_query_params(ValueMap::new())
            .with_parsed_body(Some(Value::List(vec![Value::from(1)]))).unwrap();

        assert!(original.cookie_params().is_empty());
        assert_eq!(original.query_params().len(), 1);
        assert!(original.parsed_body().is_none());

        assert_eq!(changed.cookie_params().len(), 1);
        assert!(changed.query_params().is_empty());
        assert_eq!(changed.parsed_body().and_then(Value::as_list).map(<[Value]>::len), Some(1));
        assert_eq!(changed.uri().query(), "a=1");
    }

    #[test]
    fn uploaded_files_are_shared() {
        let file = Arc::new(UploadedFile::new(
            crate::UploadSource::Stream(crate::Body::from_bytes("x")),
            Some(1),
            0,
            None,
            None,
        ).unwrap());

        let mut files = HashMap::new();
        files.insert(String::from("avatar"), Arc::clone(&file));

        let request = server_request("/").with_uploaded_files(files);
        let copy = request.with_attribute("a", 1);
        assert!(Arc::ptr_eq(&copy.uploaded_files()["avatar"], &file));
    }

    #[test]
    fn request_operations_are_available() {
        let request = server_request("http://example.com/a")
            .with_method("POST").unwrap()
            .with_header("X-Foo", "bar").unwrap();
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.request_target(), "/a");
        assert_eq!(request.header_line("x-foo"), "bar");
    }
}
