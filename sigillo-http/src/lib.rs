// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! This crate contains immutable HTTP messages and URIs, independent of the
//! version of HTTP they are transferred with.
//!
//! Every value is validated when it is constructed. Modifying a value means
//! deriving a new one with one of the `with_*` methods, which leaves the
//! original untouched:
//!
//! ```
//! use sigillo_http::{HttpMessage, HttpRequest, Method, Request, Uri};
//!
//! let uri = Uri::parse("https://example.com/search?q=rust").unwrap();
//! let request = Request::new(Method::Get, uri);
//! let json = request.with_header("Accept", "application/json").unwrap();
//!
//! assert!(!request.has_header("Accept"));
//! assert_eq!(json.header_line("Host"), "example.com");
//! assert_eq!(json.request_target(), "/search?q=rust");
//! ```

pub mod abnf;
pub mod error;
pub mod header_map;
pub mod header_value;
pub mod message;
pub mod method;
pub mod request;
pub mod response;
pub mod server_request;
pub mod status;
pub mod stream;
pub mod syntax;
pub mod uploaded_file;
pub mod uri;
pub mod value;
pub mod version;

pub use error::*;
pub use header_map::*;
pub use header_value::*;
pub use message::*;
pub use method::*;
pub use request::*;
pub use response::*;
pub use server_request::*;
pub use status::*;
pub use stream::*;
pub use uploaded_file::*;
pub use uri::*;
pub use value::*;
pub use version::*;
