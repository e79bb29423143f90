// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::io;

use strum_macros::AsRefStr;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed HTTP/1 message: {0}")]
    ParseError(#[from] HttpParseError),

    #[error(transparent)]
    Message(#[from] sigillo_http::Error),

    #[error("unsupported scheme \"{0}\"; only http is supported")]
    UnsupportedScheme(String),

    #[error("the URI has no host to connect to")]
    MissingHost,

    #[error(transparent)]
    Other(#[from] io::Error),
}

impl From<sigillo_http::InvalidArgument> for Error {
    fn from(error: sigillo_http::InvalidArgument) -> Self {
        Self::Message(error.into())
    }
}

/// An error that can occur while parsing an HTTP/1 response.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error, AsRefStr)]
pub enum HttpParseError {
    /// The body is longer than the client accepts, either as announced by
    /// `Content-Length` or as read until the end of the stream.
    ///
    /// ## Example:
    /// ```text
    /// Content-Length: 18446744073709551615
    /// ```
    #[error("body is too large")]
    BodyTooLarge,

    /// The header didn't contain a colon, it's only the name.
    ///
    /// ## Example:
    /// ```text
    /// Content-Type
    /// ```
    #[error("header line does not contain a colon")]
    HeaderDoesNotContainColon,

    /// The header (name + value) was too large.
    ///
    /// ## Example:
    /// ```
    /// // Maximum = 256, length = 300
    /// ```
    /// ```text
    /// Content-Type: aaaa...aaaa
    /// ```
    #[error("header line is too large")]
    HeaderTooLarge,

    /// The stream ended before the number of bytes announced by
    /// `Content-Length` was read.
    ///
    /// ## Example:
    /// ```text
    /// Content-Length: 10
    ///
    /// short
    /// ```
    #[error("body ended before its Content-Length")]
    IncompleteBody,

    /// The `Content-Length` field was malformed, meaning it contained non-numeric
    /// characters, was too large, was negative, or was the empty string.
    ///
    /// ## Example:
    /// ```text
    /// Content-Length: 123abc
    /// ```
    #[error("invalid Content-Length")]
    InvalidContentLength,

    /// The line ended with CR but not followed by an LF.
    ///
    /// ## Example:
    /// ```text
    /// Content-Length: 123\r
    /// ```
    #[error("CR not followed by LF")]
    InvalidCRLF,

    /// The HTTP version was invalid.
    ///
    /// ## Syntax
    /// The status line must start with `HTTP/` followed by one of:
    /// * `1.0`
    /// * `1.1`
    /// * `2` or `2.0`
    ///
    /// ## Examples:
    /// ```text
    /// HTTP/1.
    /// REST/1.1
    /// HTTP/1.1.1
    /// H/1.1
    /// ```
    #[error("invalid HTTP version")]
    InvalidHttpVersion,

    /// The status code wasn't made up of exactly three digits.
    ///
    /// ## Examples:
    /// ```text
    /// HTTP/1.1 20 OK
    /// HTTP/1.1 2000 OK
    /// HTTP/1.1 OK
    /// ```
    #[error("invalid status code")]
    InvalidStatusCode,

    /// The header block started with a continuation line, which has no
    /// header to continue.
    ///
    /// ## Example:
    /// ```text
    /// HTTP/1.1 200 OK
    ///  folded-without-a-header
    /// ```
    #[error("obsolete line folding without a preceding header")]
    OrphanedContinuationLine,

    /// The header block has more lines than the client accepts.
    #[error("too many header lines")]
    TooManyHeaders,

    /// The body uses a transfer coding that can't be decoded.
    ///
    /// ## Example:
    /// ```text
    /// Transfer-Encoding: chunked
    /// ```
    #[error("unsupported transfer coding")]
    UnsupportedTransferEncoding,
}
