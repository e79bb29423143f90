// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::{
    Body,
    Error,
    HeaderMap,
    HttpVersion,
    IntoHeaderValues,
};

/// The parts every HTTP message has in common.
#[derive(Clone, Debug, Default)]
pub struct Message {
    pub(crate) version: HttpVersion,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Body,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Read access and copy-on-write modification of a message.
///
/// Implementors only have to expose their [`Message`]. Every `with_*` method
/// validates its input first and returns a modified copy, leaving `self` as
/// it was. The body is shared between the copies.
///
/// ```
/// use sigillo_http::{HttpMessage, Response};
///
/// let original = Response::new(200).unwrap();
/// let modified = original.with_header("Content-Type", "text/plain").unwrap();
///
/// assert!(!original.has_header("content-type"));
/// assert_eq!(modified.header_line("content-type"), "text/plain");
/// ```
pub trait HttpMessage: Clone {
    fn message(&self) -> &Message;

    fn message_mut(&mut self) -> &mut Message;

    fn protocol_version(&self) -> HttpVersion {
        self.message().version
    }

    /// Accepts `1.0`, `1.1` and `2`.
    fn with_protocol_version(&self, version: &str) -> Result<Self, Error> {
        let version: HttpVersion = version.parse()?;

        let mut new = self.clone();
        new.message_mut().version = version;
        Ok(new)
    }

    /// All headers, in the order they were added and with the casing in
    /// which their names were first provided.
    fn headers(&self) -> &HeaderMap {
        &self.message().headers
    }

    fn has_header(&self, name: &str) -> bool {
        self.message().headers.contains(name)
    }

    /// The values of the header, or an empty slice if it isn't present.
    fn header(&self, name: &str) -> &[String] {
        self.message().headers.get(name)
    }

    /// The values of the header joined by `", "`.
    fn header_line(&self, name: &str) -> String {
        self.message().headers.get_line(name)
    }

    /// Replaces every value of the header.
    fn with_header(&self, name: &str, values: impl IntoHeaderValues) -> Result<Self, Error> {
        let mut new = self.clone();
        new.message_mut().headers.replace(name, values.into_header_values())?;
        Ok(new)
    }

    /// Appends to the values of the header, adding it if it's absent.
    fn with_added_header(&self, name: &str, values: impl IntoHeaderValues) -> Result<Self, Error> {
        let mut new = self.clone();
        new.message_mut().headers.append(name, values.into_header_values())?;
        Ok(new)
    }

    /// Removes the header. A copy is returned even if it isn't present.
    #[must_use]
    fn without_header(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.message_mut().headers.remove(name);
        new
    }

    /// Replaces the values of every given header.
    fn with_headers<N, V>(&self, headers: impl IntoIterator<Item = (N, V)>) -> Result<Self, Error>
            where N: AsRef<str>, V: IntoHeaderValues {
        let mut new = self.clone();
        for (name, values) in headers {
            new.message_mut().headers.replace(name.as_ref(), values.into_header_values())?;
        }
        Ok(new)
    }

    /// Appends to the values of every given header.
    fn with_added_headers<N, V>(&self, headers: impl IntoIterator<Item = (N, V)>) -> Result<Self, Error>
            where N: AsRef<str>, V: IntoHeaderValues {
        let mut new = self.clone();
        for (name, values) in headers {
            new.message_mut().headers.append(name.as_ref(), values.into_header_values())?;
        }
        Ok(new)
    }

    /// Discards all headers and adds the given ones instead.
    fn set_headers<N, V>(&self, headers: impl IntoIterator<Item = (N, V)>) -> Result<Self, Error>
            where N: AsRef<str>, V: IntoHeaderValues {
        let mut new = self.clone();
        new.message_mut().headers.clear();
        for (name, values) in headers {
            new.message_mut().headers.append(name.as_ref(), values.into_header_values())?;
        }
        Ok(new)
    }

    fn body(&self) -> &Body {
        &self.message().body
    }

    /// Replaces the body handle. The stream itself isn't copied.
    #[must_use]
    fn with_body(&self, body: Body) -> Self {
        let mut new = self.clone();
        new.message_mut().body = body;
        new
    }
}

impl HttpMessage for Message {
    fn message(&self) -> &Message {
        self
    }

    fn message_mut(&mut self) -> &mut Message {
        self
    }
}
