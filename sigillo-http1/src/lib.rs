// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The HTTP/1.x text format for the messages of `sigillo_http`, and a
//! minimal client sending requests in it.

mod client;
mod error;
mod read;
mod write;

pub use client::*;
pub use error::*;
pub use read::*;
pub use write::*;

/// Indicates the maximum length of a certain HTTP entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MaximumLength(pub usize);

impl MaximumLength {
    /// The maximum length of a full HTTP header (name + value), or of the
    /// status line, excluding the CRLF.
    pub const HEADER: MaximumLength = MaximumLength(4096);

    /// The maximum length of a response body.
    pub const BODY: MaximumLength = MaximumLength(16 * 1024 * 1024);
}
