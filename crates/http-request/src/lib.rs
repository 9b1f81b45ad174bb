//! Typed JSON HTTP requests
//!
//! This crate wraps [`reqwest`] with a small request helper: a verb function
//! takes a URL and an ordered list of request options (headers, query
//! parameters, cookies, JSON body), sends the request and decodes a 2xx JSON
//! response into the caller's type. Any other outcome is returned as an
//! [`Error`] carrying the HTTP status code and raw response body.
//!
//! # Example
//!
//! ```no_run
//! use http_request::{with_accept, with_parameter, HttpClient, Response};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct ApiResponse {
//!     message: String,
//! }
//!
//! async fn example(client: &HttpClient) -> Response<ApiResponse> {
//!     client
//!         .get(
//!             "https://api.example.com/data",
//!             [with_accept(), with_parameter("page", "1")],
//!         )
//!         .await
//! }
//! ```

mod client;
mod config;
mod error;
mod executor;
mod method;
mod options;
mod response;

pub use client::{delete, get, post, put, HttpClient, HttpClientBuilder};
pub use config::RequestConfiguration;
pub use error::{Error, ErrorKind};
pub use method::Method;
pub use options::{
    try_with_body, with_accept, with_bearer_auth, with_body, with_cookie, with_cookies,
    with_header, with_headers, with_parameter, with_parameters, with_timeout, RequestOption,
};
pub use response::{is_success, Response};
