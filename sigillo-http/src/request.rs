// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::{
    Body,
    Error,
    HttpMessage,
    InvalidArgument,
    IntoHeaderValues,
    Message,
    Method,
    Uri,
};

#[derive(Clone, Debug, Default)]
pub struct Request {
    pub(crate) message: Message,
    method: Method,
    uri: Uri,
    request_target: Option<String>,
}

impl Request {
    /// Creates a request, deriving the `Host` header from the URI.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, ..Self::default() }.with_uri(uri, false)
    }

    /// Starts building a request, deferring validation errors to
    /// [`RequestBuilder::build`].
    ///
    /// ```
    /// use sigillo_http::{HttpMessage, HttpRequest, Method, Request};
    ///
    /// let request = Request::builder()
    ///     .method("POST")
    ///     .uri("http://example.com:8080/submit")
    ///     .header("Accept", "application/json")
    ///     .body("payload")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(request.method(), Method::Post);
    /// assert_eq!(request.header_line("Host"), "example.com:8080");
    /// assert_eq!(request.body().to_string(), "payload");
    /// ```
    pub fn builder() -> RequestBuilder {
        RequestBuilder {
            inner: Ok(Request::default()),
        }
    }
}

impl HttpMessage for Request {
    fn message(&self) -> &Message {
        &self.message
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}

impl HttpRequest for Request {
    fn request(&self) -> &Request {
        self
    }

    fn request_mut(&mut self) -> &mut Request {
        self
    }
}

/// Read access and copy-on-write modification of a request.
pub trait HttpRequest: HttpMessage {
    fn request(&self) -> &Request;

    fn request_mut(&mut self) -> &mut Request;

    fn method(&self) -> Method {
        self.request().method
    }

    /// Fails unless the method is one of `GET`, `POST`, `PUT`, `PATCH`,
    /// `DELETE`, `HEAD`, `OPTIONS` or `TRACE`. Methods are case-sensitive.
    fn with_method(&self, method: &str) -> Result<Self, Error> {
        let method: Method = method.parse()?;

        let mut new = self.clone();
        new.request_mut().method = method;
        Ok(new)
    }

    fn uri(&self) -> &Uri {
        &self.request().uri
    }

    /// Replaces the URI. Unless `preserve_host` is set and the request
    /// already has a `Host` header, the header is derived from the host and
    /// port of the new URI. A URI without a host leaves the header as it is.
    #[must_use]
    fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        let mut new = self.clone();

        if !preserve_host || !new.has_header("Host") {
            if let Some(host) = uri.host_header_value() {
                new.message_mut().headers.replace_unchecked("Host", vec![host]);
            }
        }

        new.request_mut().uri = uri;
        new
    }

    /// The request target, which is the explicitly set one or otherwise the
    /// origin-form derived from the URI.
    fn request_target(&self) -> String {
        match &self.request().request_target {
            Some(target) => target.clone(),
            None => self.request().uri.origin_form(),
        }
    }

    /// Overrides the request target, e.g. with the asterisk-form `*`.
    fn with_request_target(&self, target: &str) -> Result<Self, Error> {
        if target.chars().any(char::is_whitespace) {
            return Err(InvalidArgument::RequestTarget(target.to_string()).into());
        }

        let mut new = self.clone();
        new.request_mut().request_target = Some(target.to_string());
        Ok(new)
    }

    /// Reverts to the request target derived from the URI.
    #[must_use]
    fn without_request_target(&self) -> Self {
        let mut new = self.clone();
        new.request_mut().request_target = None;
        new
    }

    /// Parses `uri` and applies it, recomputing the `Host` header.
    fn set_uri(&self, uri: &str) -> Result<Self, Error> {
        let uri = Uri::parse(uri)?;
        Ok(self.with_uri(uri, false))
    }

    /// Replaces the body with a new in-memory stream holding `body`. A form
    /// body is url-encoded and sets the `Content-Type` when there's none yet.
    #[must_use]
    fn set_body(&self, body: impl Into<RequestBody>) -> Self {
        let body = body.into();

        let mut new = self.clone();
        if matches!(body, RequestBody::Form(..)) && !new.has_header("Content-Type") {
            new.message_mut().headers.replace_unchecked(
                "Content-Type",
                vec![String::from("application/x-www-form-urlencoded")],
            );
        }

        new.message_mut().body = Body::from_bytes(body.into_bytes());
        new
    }
}

/// The content of a body given to [`HttpRequest::set_body`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestBody {
    Text(String),
    Bytes(Vec<u8>),

    /// Key-value pairs, serialized as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

impl RequestBody {
    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
            where K: Into<String>, V: Into<String> {
        Self::Form(pairs.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }

    /// The encoded body. Form keys and values are percent-encoded, so a space
    /// is written as `%20`.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Bytes(bytes) => bytes,
            Self::Form(pairs) => pairs.iter()
                .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
                .collect::<Vec<_>>()
                .join("&")
                .into_bytes(),
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<(String, String)>> for RequestBody {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::Form(pairs)
    }
}

/// Builds a [`Request`] step by step. The first failing step determines the
/// error returned by [`RequestBuilder::build`]; later steps are skipped.
#[derive(Debug)]
#[must_use]
pub struct RequestBuilder {
    inner: Result<Request, Error>,
}

impl RequestBuilder {
    fn and_then(self, step: impl FnOnce(Request) -> Result<Request, Error>) -> Self {
        Self {
            inner: self.inner.and_then(step),
        }
    }

    pub fn method(self, method: &str) -> Self {
        self.and_then(|request| request.with_method(method))
    }

    pub fn uri(self, uri: &str) -> Self {
        self.and_then(|request| request.set_uri(uri))
    }

    pub fn version(self, version: &str) -> Self {
        self.and_then(|request| request.with_protocol_version(version))
    }

    /// Adds to the values of the header.
    pub fn header(self, name: &str, values: impl IntoHeaderValues) -> Self {
        self.and_then(|request| request.with_added_header(name, values))
    }

    pub fn request_target(self, target: &str) -> Self {
        self.and_then(|request| request.with_request_target(target))
    }

    pub fn body(self, body: impl Into<RequestBody>) -> Self {
        self.and_then(|request| Ok(request.set_body(body)))
    }

    pub fn build(self) -> Result<Request, Error> {
        self.inner
    }
}
