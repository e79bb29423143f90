// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use sigillo_http::{
    default_port,
    Body,
    HttpMessage,
    HttpRequest,
    HttpVersion,
    IntoHeaderValues,
    Request,
    RequestBody,
    Response,
};

use tokio::{
    io::BufReader,
    net::TcpStream,
};

use tracing::debug;

use crate::{
    body_to_bytes,
    read_response_body,
    read_response_excluding_body,
    write_request,
    Error,
    MaximumLength,
};

/// The settings of a [`Client`].
#[derive(Clone, Debug)]
pub struct ClientSettings {
    /// The protocol version requests are created with. Requests for HTTP/2
    /// are sent as HTTP/1.1.
    pub protocol_version: HttpVersion,

    /// The `User-Agent` header sent with every request, if any.
    pub user_agent: Option<String>,

    /// Headers added to every request.
    pub default_headers: Vec<(String, String)>,

    /// The maximum length of the status line and of every header line of a
    /// response.
    pub maximum_header_length: MaximumLength,

    /// The maximum length of a response body. Longer responses are refused
    /// before the body is buffered.
    pub maximum_body_length: MaximumLength,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            protocol_version: HttpVersion::Http11,
            user_agent: Some(format!("sigillo/{}", env!("CARGO_PKG_VERSION"))),
            default_headers: Vec::new(),
            maximum_header_length: MaximumLength::HEADER,
            maximum_body_length: MaximumLength::BODY,
        }
    }
}

/// A minimal HTTP/1 client. Every request is sent over a new connection,
/// which is closed after the response has been read.
///
/// Requests are derived from a template, whose headers can be changed with
/// [`Client::set_header`] and friends.
#[derive(Clone, Debug)]
pub struct Client {
    settings: ClientSettings,
    template: Request,
}

impl Client {
    pub fn new(settings: ClientSettings) -> Result<Self, Error> {
        let mut template = Request::default()
            .with_protocol_version(settings.protocol_version.as_str())?;

        if let Some(user_agent) = &settings.user_agent {
            template = template.with_header("User-Agent", user_agent)?;
        }

        template = template.with_added_headers(
            settings.default_headers.iter().map(|(name, value)| (name, value))
        )?;

        Ok(Self { settings, template })
    }

    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// The request every request of this client is derived from.
    #[must_use]
    pub fn request_template(&self) -> &Request {
        &self.template
    }

    pub fn set_header(&mut self, name: &str, values: impl IntoHeaderValues) -> Result<(), Error> {
        self.template = self.template.with_header(name, values)?;
        Ok(())
    }

    pub fn add_header(&mut self, name: &str, values: impl IntoHeaderValues) -> Result<(), Error> {
        self.template = self.template.with_added_header(name, values)?;
        Ok(())
    }

    pub fn remove_header(&mut self, name: &str) {
        self.template = self.template.without_header(name);
    }

    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        let request = self.template
            .set_uri(url)?
            .with_method("GET")?
            .with_body(Body::empty());
        self.send(request).await
    }

    pub async fn post(&self, url: &str, body: impl Into<RequestBody>) -> Result<Response, Error> {
        let request = self.template
            .set_uri(url)?
            .with_method("POST")?
            .set_body(body);
        self.send(request).await
    }

    /// Sends the request with `Connection: close`, and a `Content-Length` if
    /// the body isn't empty, then reads the response.
    pub async fn send(&self, request: Request) -> Result<Response, Error> {
        let uri = request.uri();
        if uri.scheme() != "http" {
            return Err(Error::UnsupportedScheme(uri.scheme().to_string()));
        }

        let host = uri.host()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        if host.is_empty() {
            return Err(Error::MissingHost);
        }

        let port = uri.port()
            .or_else(|| default_port(uri.scheme()))
            .unwrap_or(80);

        let body = body_to_bytes(request.body())?;
        let mut request = request.with_header("Connection", "close")?;
        if !body.is_empty() {
            request = request.with_header("Content-Length", body.len())?;
        }

        debug!("Connecting to {}:{}", host, port);
        let mut stream = BufReader::new(TcpStream::connect((host.as_str(), port)).await?);

        write_request(stream.get_mut(), &request, &body).await?;

        let response = read_response_excluding_body(&mut stream, self.settings.maximum_header_length).await?;
        debug!(status = response.status_code(), "Received response to {} {}", request.method(), request.uri());

        let response_body = read_response_body(&mut stream, request.method(), &response, self.settings.maximum_body_length).await?;
        Ok(response.with_body(response_body))
    }
}
