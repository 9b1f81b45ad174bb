//! HTTP request error types

use std::fmt;

use thiserror::Error as ThisError;

/// Boxed underlying error kept for diagnostics
type Source = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stage of the request pipeline at which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The transport request could not be built (bad URL, header or cookie)
    Build,
    /// A request body could not be serialized to JSON
    Serialization,
    /// The request could not be sent or no response was received
    Transport,
    /// The server answered with a status outside `200..300`
    Status,
    /// A successful response body could not be decoded into the target type
    Decode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Build => "build",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Transport => "transport",
            ErrorKind::Status => "status",
            ErrorKind::Decode => "decode",
        };
        f.write_str(name)
    }
}

/// Error returned by every request helper
///
/// `code` is the HTTP status for [`ErrorKind::Status`] failures and `0`
/// otherwise. `body` holds the raw response payload of a non-2xx response.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    code: u16,
    body: Vec<u8>,
    message: String,
    #[source]
    source: Option<Source>,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: 0,
            body: Vec::new(),
            message: message.into(),
            source: None,
        }
    }

    fn with_source(mut self, source: impl Into<Source>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Request could not be constructed
    pub(crate) fn build(source: impl Into<Source>) -> Self {
        Self::new(ErrorKind::Build, "failed to create request").with_source(source)
    }

    /// Client builder rejected its configuration
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Build, message)
    }

    /// Request body could not be serialized
    pub(crate) fn serialization(source: serde_json::Error) -> Self {
        Self::new(ErrorKind::Serialization, "failed to serialize request body")
            .with_source(source)
    }

    /// Request could not be sent
    pub(crate) fn transport(source: reqwest::Error) -> Self {
        Self::new(ErrorKind::Transport, "failed to send request").with_source(source)
    }

    /// Response status is outside the success range
    pub(crate) fn status(code: u16, body: Vec<u8>) -> Self {
        Self {
            kind: ErrorKind::Status,
            code,
            body,
            message: format!("status code does not indicate success: {}", code),
            source: None,
        }
    }

    /// Successful response could not be decoded
    pub(crate) fn decode(field: Option<String>, source: impl Into<Source>) -> Self {
        let message = match field {
            Some(field) => format!("failed to decode field \"{}\"", field),
            None => "failed to decode response".to_string(),
        };
        Self::new(ErrorKind::Decode, message).with_source(source)
    }

    /// Failure classification
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status code, `0` when no response status applies
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Raw response body, empty unless the server answered with a non-2xx status
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Response body as text, replacing invalid UTF-8
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Human readable description
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Consume the error and take ownership of the raw response body
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Check if the server answered with a non-2xx status
    pub fn is_status(&self) -> bool {
        self.kind == ErrorKind::Status
    }

    /// Check if the server answered with a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.is_status() && (400..500).contains(&self.code)
    }

    /// Check if the server answered with a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.is_status() && (500..600).contains(&self.code)
    }
}
