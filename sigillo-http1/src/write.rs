// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Write as _;

use sigillo_http::{
    Body,
    BodyStream,
    HttpRequest,
    HttpVersion,
};

use tokio::io::{
    AsyncWrite,
    AsyncWriteExt,
};

use tracing::trace;

use crate::Error;

/// Formats the request-line and the header block, including the empty line
/// that ends it. Requests for HTTP/2 are written as HTTP/1.1, since this is
/// the HTTP/1 text format.
///
/// ```text
/// request-line   = method SP request-target SP HTTP-version
/// field-line     = field-name ":" OWS field-value OWS
/// ```
pub fn format_request_head(request: &impl HttpRequest) -> String {
    let version = match request.protocol_version() {
        HttpVersion::Http10 => HttpVersion::Http10,
        HttpVersion::Http11 | HttpVersion::Http2 => HttpVersion::Http11,
    };

    let mut head = String::with_capacity(256);
    _ = write!(head, "{} {} {}\r\n", request.method(), request.request_target(), version.to_http_version());

    for (name, values) in request.headers().iter() {
        _ = write!(head, "{}: {}\r\n", name, values.join(", "));
    }

    head.push_str("\r\n");
    head
}

/// Reads the entire body, from the start if the stream allows it.
pub fn body_to_bytes(body: &Body) -> Result<Vec<u8>, Error> {
    let mut stream = body.lock();
    if stream.is_seekable() {
        stream.rewind()?;
    }

    Ok(stream.contents()?)
}

/// Writes the request head followed by `body`, and flushes the stream.
pub async fn write_request<W>(stream: &mut W, request: &impl HttpRequest, body: &[u8]) -> Result<(), Error>
        where W: AsyncWrite + Unpin {
    let head = format_request_head(request);
    trace!("Sending request head of {} bytes with a body of {} bytes", head.len(), body.len());

    stream.write_all(head.as_bytes()).await?;
    if !body.is_empty() {
        stream.write_all(body).await?;
    }
    stream.flush().await?;
    Ok(())
}
