// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::{
    status,
    Error,
    HttpMessage,
    InvalidArgument,
    Message,
    StatusCodeClass,
};

#[derive(Clone, Debug)]
pub struct Response {
    message: Message,
    status: u16,
    reason: String,
}

impl Response {
    /// Creates a response with the registered reason phrase of `status`.
    pub fn new(status: u16) -> Result<Self, Error> {
        Self::default().with_status(status, "")
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn reason_phrase(&self) -> &str {
        &self.reason
    }

    #[must_use]
    pub fn status_class(&self) -> StatusCodeClass {
        StatusCodeClass::of(self.status).unwrap_or(StatusCodeClass::ServerError)
    }

    /// Sets the status code and reason phrase. An empty `reason` is replaced
    /// by the registered phrase of the code, or stays empty if the code has
    /// none.
    pub fn with_status(&self, status: u16, reason: &str) -> Result<Self, Error> {
        if !status::is_valid_status_code(status) {
            return Err(InvalidArgument::StatusCode(status).into());
        }

        if reason.contains(['\r', '\n']) {
            return Err(InvalidArgument::ReasonPhrase(reason.to_string()).into());
        }

        let reason = match reason {
            "" => status::reason_phrase(status).unwrap_or_default(),
            reason => reason,
        };

        let mut new = self.clone();
        new.status = status;
        new.reason = reason.to_string();
        Ok(new)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self {
            message: Message::default(),
            status: 200,
            reason: String::from("OK"),
        }
    }
}

impl HttpMessage for Response {
    fn message(&self) -> &Message {
        &self.message
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}
