// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use sigillo_http::{
    Body,
    HttpMessage,
    HttpVersion,
    Method,
    Response,
};

use tokio::io::{
    AsyncBufReadExt,
    AsyncReadExt,
};

use tracing::trace;

use crate::{
    Error,
    HttpParseError,
    MaximumLength,
};

/// Reads a line from the stream, up to the maximum length. Bytes that aren't
/// valid UTF-8 are replaced.
pub async fn read_crlf_line<R>(stream: &mut R, maximum_length: MaximumLength) -> Result<String, Error>
        where R: AsyncBufReadExt + Unpin {
    let mut line = Vec::new();

    while line.len() < maximum_length.0 {
        let byte = stream.read_u8().await?;
        if byte == b'\r' {
            let byte = stream.read_u8().await?;
            if byte == b'\n' {
                return Ok(String::from_utf8_lossy(&line).into_owned());
            }
            return Err(Error::ParseError(HttpParseError::InvalidCRLF));
        }

        line.push(byte);
    }

    Err(Error::ParseError(HttpParseError::HeaderTooLarge))
}

/// Parses the status line of a response.
///
/// ```text
/// status-line = HTTP-version SP status-code SP [ reason-phrase ]
/// ```
///
/// The space before an empty reason phrase may be omitted.
///
/// # References
/// * [RFC 9112 Section 4](https://www.rfc-editor.org/rfc/rfc9112.html#name-status-line)
pub fn parse_status_line(line: &str) -> Result<(HttpVersion, u16, &str), HttpParseError> {
    let rest = line.strip_prefix("HTTP/").ok_or(HttpParseError::InvalidHttpVersion)?;
    let (version, rest) = rest.split_once(' ').ok_or(HttpParseError::InvalidHttpVersion)?;

    let version = match version {
        "1.0" => HttpVersion::Http10,
        "1.1" => HttpVersion::Http11,
        "2" | "2.0" => HttpVersion::Http2,
        _ => return Err(HttpParseError::InvalidHttpVersion),
    };

    let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));
    if code.len() != 3 || !code.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(HttpParseError::InvalidStatusCode);
    }
    let code = code.parse().map_err(|_| HttpParseError::InvalidStatusCode)?;

    Ok((version, code, reason.trim()))
}

/// The maximum number of lines in a header block, continuation lines
/// included.
pub const MAXIMUM_HEADER_LINES: usize = 100;

/// Reads the header block from the stream, up to and including the empty
/// line. Obsolete line foldings are joined with a single space.
pub async fn read_headers<R>(stream: &mut R, maximum_length: MaximumLength) -> Result<Vec<(String, String)>, Error>
        where R: AsyncBufReadExt + Unpin {
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut line_count = 0;

    loop {
        let line = read_crlf_line(stream, maximum_length).await?;
        if line.is_empty() {
            return Ok(headers);
        }

        line_count += 1;
        if line_count > MAXIMUM_HEADER_LINES {
            return Err(Error::ParseError(HttpParseError::TooManyHeaders));
        }

        if line.starts_with([' ', '\t']) {
            let Some((_, value)) = headers.last_mut() else {
                return Err(Error::ParseError(HttpParseError::OrphanedContinuationLine));
            };
            value.push(' ');
            value.push_str(line.trim());
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(Error::ParseError(HttpParseError::HeaderDoesNotContainColon));
        };

        headers.push((name.trim().to_string(), value.trim().to_string()));
    }
}

/// Read the status line and headers from the stream, without reading the
/// body. Interim (1xx) responses are skipped, except for `101 Switching
/// Protocols`, which is final.
pub async fn read_response_excluding_body<R>(stream: &mut R, maximum_length: MaximumLength) -> Result<Response, Error>
        where R: AsyncBufReadExt + Unpin {
    loop {
        let line = read_crlf_line(stream, maximum_length).await?;
        let (version, code, reason) = parse_status_line(&line)?;
        let headers = read_headers(stream, maximum_length).await?;

        if (100..200).contains(&code) && code != 101 {
            trace!("Skipping interim response {code} {reason}");
            continue;
        }

        let mut response = Response::default()
            .with_status(code, reason)?
            .with_protocol_version(version.as_str())?;
        for (name, value) in headers {
            response = response.with_added_header(&name, value)?;
        }

        return Ok(response);
    }
}

/// Whether a response to a request with `method` can have a body.
///
/// # References
/// * [RFC 9112 Section 6.3](https://www.rfc-editor.org/rfc/rfc9112.html#name-message-body-length)
fn has_body(method: Method, response: &Response) -> bool {
    let status = response.status_code();
    method != Method::Head && !(100..200).contains(&status) && status != 204 && status != 304
}

/// Reads the body of the response into an in-memory stream. The length is
/// taken from `Content-Length`, otherwise the body runs until the end of the
/// stream. Bodies longer than `maximum_length` are refused.
pub async fn read_response_body<R>(stream: &mut R, method: Method, response: &Response, maximum_length: MaximumLength) -> Result<Body, Error>
        where R: AsyncBufReadExt + Unpin {
    if !has_body(method, response) {
        return Ok(Body::empty());
    }

    let transfer_encoding = response.header_line("Transfer-Encoding");
    if !transfer_encoding.is_empty() && !transfer_encoding.eq_ignore_ascii_case("identity") {
        return Err(Error::ParseError(HttpParseError::UnsupportedTransferEncoding));
    }

    let mut body = Vec::new();
    match response.header("Content-Length").first() {
        Some(content_length) => {
            let length = parse_content_length(content_length)?;
            if length > maximum_length.0 {
                return Err(Error::ParseError(HttpParseError::BodyTooLarge));
            }

            (&mut *stream).take(length as u64).read_to_end(&mut body).await?;
            if body.len() != length {
                return Err(Error::ParseError(HttpParseError::IncompleteBody));
            }
        }
        None => {
            let limit = (maximum_length.0 as u64).saturating_add(1);
            (&mut *stream).take(limit).read_to_end(&mut body).await?;
            if body.len() > maximum_length.0 {
                return Err(Error::ParseError(HttpParseError::BodyTooLarge));
            }
        }
    }

    trace!("Read response body of {} bytes", body.len());
    Ok(Body::from_bytes(body))
}

fn parse_content_length(value: &str) -> Result<usize, HttpParseError> {
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(HttpParseError::InvalidContentLength);
    }

    value.parse().map_err(|_| HttpParseError::InvalidContentLength)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("HTTP/1.1 200 OK", Ok((HttpVersion::Http11, 200, "OK")))]
    #[case("HTTP/1.0 404 Not Found", Ok((HttpVersion::Http10, 404, "Not Found")))]
    #[case("HTTP/2 204 ", Ok((HttpVersion::Http2, 204, "")))]
    #[case("HTTP/2.0 302 Found", Ok((HttpVersion::Http2, 302, "Found")))]
    #[case("HTTP/1.1 599", Ok((HttpVersion::Http11, 599, "")))]
    #[case("HTTP/1.1 200 Very  Spacious ", Ok((HttpVersion::Http11, 200, "Very  Spacious")))]
    #[case("HTTP/1.2 200 OK", Err(HttpParseError::InvalidHttpVersion))]
    #[case("REST/1.1 200 OK", Err(HttpParseError::InvalidHttpVersion))]
    #[case("HTTP/1.1", Err(HttpParseError::InvalidHttpVersion))]
    #[case("HTTP/1.1 20 OK", Err(HttpParseError::InvalidStatusCode))]
    #[case("HTTP/1.1 2000 OK", Err(HttpParseError::InvalidStatusCode))]
    #[case("HTTP/1.1 OK", Err(HttpParseError::InvalidStatusCode))]
    fn test_parse_status_line(#[case] input: &str, #[case] expected: Result<(HttpVersion, u16, &str), HttpParseError>) {
        assert_eq!(parse_status_line(input), expected);
    }

    #[rstest]
    #[case(b"\r\n", "")]
    #[case(b"Content-Type: text/html\r\n", "Content-Type: text/html")]
    #[case(b"caf\xc3\xa9\r\nnext", "caf\u{e9}")]
    #[tokio::test]
    async fn test_read_crlf_line(#[case] input: &[u8], #[case] expected: &str) {
        let mut stream = std::io::Cursor::new(input);
        assert_eq!(read_crlf_line(&mut stream, MaximumLength::HEADER).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn read_crlf_line_errors() {
        let mut stream = std::io::Cursor::new(b"bare\rcarriage\r\n");
        let error = read_crlf_line(&mut stream, MaximumLength::HEADER).await.unwrap_err();
        assert!(matches!(error, Error::ParseError(HttpParseError::InvalidCRLF)), "{error:?}");

        let mut stream = std::io::Cursor::new(b"a very long line\r\n");
        let error = read_crlf_line(&mut stream, MaximumLength(4)).await.unwrap_err();
        assert!(matches!(error, Error::ParseError(HttpParseError::HeaderTooLarge)), "{error:?}");

        let mut stream = std::io::Cursor::new(b"unterminated");
        let error = read_crlf_line(&mut stream, MaximumLength::HEADER).await.unwrap_err();
        assert!(matches!(error, Error::Other(..)), "{error:?}");
    }

    #[tokio::test]
    async fn read_headers_with_folding() {
        let mut stream = std::io::Cursor::new(b"A: 1\r\nB:2\r\n  continued\r\nA :  3 \r\n\r\nbody");
        let headers = read_headers(&mut stream, MaximumLength::HEADER).await.unwrap();
        assert_eq!(headers, [
            (String::from("A"), String::from("1")),
            (String::from("B"), String::from("2 continued")),
            (String::from("A"), String::from("3")),
        ]);
    }

    #[rstest]
    #[case(b"no colon here\r\n\r\n", HttpParseError::HeaderDoesNotContainColon)]
    #[case(b" orphan\r\n\r\n", HttpParseError::OrphanedContinuationLine)]
    #[tokio::test]
    async fn test_read_headers_errors(#[case] input: &[u8], #[case] expected: HttpParseError) {
        let mut stream = std::io::Cursor::new(input);
        match read_headers(&mut stream, MaximumLength::HEADER).await {
            Err(Error::ParseError(error)) => assert_eq!(error, expected),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn read_full_response() {
        let mut stream = std::io::Cursor::new(
            b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 201 Created\r\nContent-Length: 5\r\nX-Multi: a\r\nx-multi: b\r\n\r\nhello trailing".to_vec()
        );

        let response = read_response_excluding_body(&mut stream, MaximumLength::HEADER).await.unwrap();
        assert_eq!(response.status_code(), 201);
        assert_eq!(response.reason_phrase(), "Created");
        assert_eq!(response.protocol_version(), HttpVersion::Http11);
        assert_eq!(response.header_line("X-Multi"), "a, b");

        let body = read_response_body(&mut stream, Method::Get, &response, MaximumLength::BODY).await.unwrap();
        assert_eq!(body.to_string(), "hello");
    }

    #[tokio::test]
    async fn body_until_end_of_stream() {
        let mut stream = std::io::Cursor::new(b"HTTP/1.0 200 OK\r\n\r\nall of it".to_vec());
        let response = read_response_excluding_body(&mut stream, MaximumLength::HEADER).await.unwrap();
        assert_eq!(response.protocol_version(), HttpVersion::Http10);

        let body = read_response_body(&mut stream, Method::Get, &response, MaximumLength::BODY).await.unwrap();
        assert_eq!(body.to_string(), "all of it");
    }

    #[rstest]
    #[case(Method::Head, 200)]
    #[case(Method::Get, 204)]
    #[case(Method::Get, 304)]
    #[tokio::test]
    async fn responses_without_body(#[case] method: Method, #[case] status: u16) {
        let mut stream = std::io::Cursor::new(b"ignored".to_vec());
        let response = Response::new(status).unwrap().with_header("Content-Length", 7).unwrap();
        let body = read_response_body(&mut stream, method, &response, MaximumLength::BODY).await.unwrap();
        assert_eq!(body.to_string(), "");
    }

    #[rstest]
    #[case("12abc", Some(HttpParseError::InvalidContentLength))]
    #[case("-1", Some(HttpParseError::InvalidContentLength))]
    #[case("", Some(HttpParseError::InvalidContentLength))]
    #[case("99999999999999999999999", Some(HttpParseError::InvalidContentLength))]
    #[case("3", None)]
    fn test_parse_content_length(#[case] input: &str, #[case] error: Option<HttpParseError>) {
        assert_eq!(parse_content_length(input).err(), error);
    }

    #[rstest]
    #[case(b"HTTP/1.1 200 OK\r\nContent-Length: 18446744073709551615\r\n\r\nshort", MaximumLength::BODY, HttpParseError::BodyTooLarge)]
    #[case(b"HTTP/1.1 200 OK\r\nContent-Length: 99999999999\r\n\r\nshort", MaximumLength::BODY, HttpParseError::BodyTooLarge)]
    #[case(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nshort", MaximumLength::BODY, HttpParseError::IncompleteBody)]
    #[case(b"HTTP/1.1 200 OK\r\n\r\nmore than eight", MaximumLength(8), HttpParseError::BodyTooLarge)]
    #[tokio::test]
    async fn test_read_response_body_errors(#[case] input: &[u8], #[case] maximum_length: MaximumLength, #[case] expected: HttpParseError) {
        let mut stream = std::io::Cursor::new(input);
        let response = read_response_excluding_body(&mut stream, MaximumLength::HEADER).await.unwrap();
        match read_response_body(&mut stream, Method::Get, &response, maximum_length).await {
            Err(Error::ParseError(error)) => assert_eq!(error, expected),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn body_exactly_at_the_maximum() {
        let mut stream = std::io::Cursor::new(b"12345678".to_vec());
        let response = Response::default();
        let body = read_response_body(&mut stream, Method::Get, &response, MaximumLength(8)).await.unwrap();
        assert_eq!(body.to_string(), "12345678");
    }

    #[tokio::test]
    async fn too_many_header_lines() {
        let mut input = String::new();
        for index in 0..=MAXIMUM_HEADER_LINES {
            input.push_str(&format!("X-Header-{index}: value\r\n"));
        }
        input.push_str("\r\n");

        let mut stream = std::io::Cursor::new(input.into_bytes());
        match read_headers(&mut stream, MaximumLength::HEADER).await {
            Err(Error::ParseError(error)) => assert_eq!(error, HttpParseError::TooManyHeaders),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn header_lines_up_to_the_maximum() {
        let mut input = String::new();
        for index in 0..MAXIMUM_HEADER_LINES {
            input.push_str(&format!("X-Header-{index}: value\r\n"));
        }
        input.push_str("\r\n");

        let mut stream = std::io::Cursor::new(input.into_bytes());
        let headers = read_headers(&mut stream, MaximumLength::HEADER).await.unwrap();
        assert_eq!(headers.len(), MAXIMUM_HEADER_LINES);
    }

    #[tokio::test]
    async fn chunked_bodies_are_refused() {
        let mut stream = std::io::Cursor::new(b"5\r\nhello\r\n0\r\n\r\n".to_vec());
        let response = Response::default().with_header("Transfer-Encoding", "chunked").unwrap();
        let error = read_response_body(&mut stream, Method::Get, &response, MaximumLength::BODY).await.unwrap_err();
        assert!(matches!(error, Error::ParseError(HttpParseError::UnsupportedTransferEncoding)));
    }
}
