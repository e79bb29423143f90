// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{
    io,
    path::PathBuf,
};

use strum_macros::AsRefStr;

use crate::{
    syntax::SyntaxError,
    UploadErrorCode,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every fallible operation of this crate fails with one of these two
/// families. Validation is performed before a new value is produced, so a
/// failed `with_*` call never leaves a half-updated message behind.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    #[error("runtime failure: {0}")]
    Runtime(#[from] RuntimeFailure),
}

impl Error {
    /// The name of the violated constraint, e.g. `HeaderName` or
    /// `StreamNotReadable`.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::InvalidArgument(error) => error.as_ref(),
            Self::Runtime(error) => error.as_ref(),
        }
    }

    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(..))
    }

    #[must_use]
    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime(..))
    }
}

/// Malformed or out-of-range input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error, AsRefStr)]
pub enum InvalidArgument {
    /// Only `1.0`, `1.1` and `2` are accepted.
    ///
    /// ## Examples:
    /// ```text
    /// 1.2
    /// 2.0
    /// HTTP/1.1
    /// ```
    #[error("unsupported HTTP protocol version \"{0}\"; must be one of 1.0, 1.1 or 2")]
    ProtocolVersion(String),

    /// The header name isn't a `token`.
    ///
    /// ## Examples:
    /// ```text
    /// Content Type
    /// X-Header:
    /// ```
    #[error("{name:?} is not a valid header name: it {reason}")]
    HeaderName {
        name: String,
        reason: SyntaxError,
    },

    /// The header value contains a line break that isn't part of an
    /// obsolete line folding (CRLF followed by whitespace), or a control
    /// character.
    #[error("{value:?} is not a valid header value: it {reason}")]
    HeaderValue {
        value: String,
        reason: SyntaxError,
    },

    /// A header was given an empty list of values.
    #[error("header \"{0}\" must be given at least one value")]
    EmptyHeaderValues(String),

    #[error("unsupported HTTP method \"{0}\"")]
    Method(String),

    #[error("invalid status code {0}; must be an integer between 100 and 599, inclusive")]
    StatusCode(u16),

    #[error("invalid reason phrase {0:?}; cannot contain line breaks")]
    ReasonPhrase(String),

    #[error("invalid request target \"{0}\"; cannot contain whitespace")]
    RequestTarget(String),

    #[error("the URI {0:?} appears to be malformed")]
    MalformedUri(String),

    #[error("invalid scheme \"{0}\"; must be a valid RFC 3986 scheme")]
    Scheme(String),

    #[error("unsupported scheme \"{0}\"")]
    UnsupportedScheme(String),

    #[error("invalid host {0:?}")]
    Host(String),

    #[error("invalid port {0}; must be a valid TCP/UDP port")]
    Port(u32),

    #[error("invalid path; must not contain a query string")]
    PathContainsQuery,

    #[error("invalid path; must not contain a URI fragment")]
    PathContainsFragment,

    #[error("query string must not include a URI fragment")]
    QueryContainsFragment,

    #[error("the path of a URI with an authority must start with a slash \"/\" or be empty")]
    AuthorityPathNotAbsolute,

    #[error("the path of a URI without an authority must not start with two slashes \"//\"")]
    PathStartsWithDoubleSlash,

    #[error("a relative URI must not have a path beginning with a segment containing a colon")]
    RelativePathWithColon,

    #[error("upload error status {0} must be between 0 and 8, inclusive")]
    UploadErrorCode(u8),

    #[error("invalid path provided for move operation; must be non-empty")]
    EmptyTargetPath,

    #[error("the target directory `{0}` does not exist or is not writable")]
    TargetDirectory(PathBuf),

    #[error("invalid stream mode \"{0}\"")]
    StreamMode(String),

    #[error("invalid stream reference `{path}`: {reason}")]
    StreamReference {
        path: PathBuf,
        reason: String,
    },

    #[error("a parsed body must be absent, a list, a map or an opaque object; received {0}")]
    ParsedBodyType(&'static str),
}

/// The operation is impossible given the current state of the object or of
/// an external resource.
#[derive(Debug, thiserror::Error, AsRefStr)]
pub enum RuntimeFailure {
    #[error("no resource available; the stream was closed or detached")]
    StreamDetached,

    #[error("stream is not readable")]
    StreamNotReadable,

    #[error("stream is not writable")]
    StreamNotWritable,

    #[error("stream is not seekable")]
    StreamNotSeekable,

    #[error("cannot use uploaded file due to upload error: {0}")]
    UploadError(UploadErrorCode),

    #[error("cannot use uploaded file; it has already been moved")]
    UploadAlreadyMoved,

    #[error("failure {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: io::Error,
    },
}

impl RuntimeFailure {
    pub(crate) fn io(operation: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Io { operation, source }
    }
}
