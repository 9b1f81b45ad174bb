//! Request configuration

use std::collections::HashMap;
use std::time::Duration;

use crate::error::Error;
use crate::options::RequestOption;
use crate::response::Response;

/// Headers, query parameters, cookies and body collected from request options
///
/// Every map keeps the last value written for a key. Keys are stored exactly
/// as supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfiguration {
    /// Request headers
    ///
    /// Prefer [`RequestConfiguration::set_header`], which records write order
    /// so that keys differing only in case resolve to the last one written.
    pub headers: HashMap<String, String>,
    /// Query parameters, encoded into the URL when the request is built
    pub parameters: HashMap<String, String>,
    /// Cookies, sent in the `Cookie` header
    pub cookies: HashMap<String, String>,
    /// Serialized request body
    pub body: Option<Vec<u8>>,
    /// Deadline for this request, overriding the client timeout
    pub timeout: Option<Duration>,
    header_order: Vec<String>,
}

impl RequestConfiguration {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply options in order to an empty configuration
    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = RequestOption>,
    {
        let mut config = Self::new();
        config.apply(options);
        config
    }

    /// Apply options in order to this configuration
    pub fn apply<I>(&mut self, options: I)
    where
        I: IntoIterator<Item = RequestOption>,
    {
        for option in options {
            option.apply(self);
        }
    }

    /// Set a header, replacing any previous value for `key`
    pub fn set_header(&mut self, key: String, value: String) {
        self.header_order.retain(|k| *k != key);
        self.header_order.push(key.clone());
        self.headers.insert(key, value);
    }

    /// Headers in the order they should be applied
    ///
    /// Keys written directly into `headers` come first, sorted. Keys written
    /// through [`set_header`](Self::set_header) follow in write order, so the
    /// latest write wins when two keys name the same HTTP header.
    pub(crate) fn ordered_headers(&self) -> Vec<(&str, &str)> {
        let mut untracked: Vec<_> = self
            .headers
            .iter()
            .filter(|(key, _)| !self.header_order.contains(*key))
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        untracked.sort();

        let tracked = self.header_order.iter().filter_map(|key| {
            self.headers
                .get(key)
                .map(|value| (key.as_str(), value.as_str()))
        });

        untracked.into_iter().chain(tracked).collect()
    }

    /// Cookies rendered as a `Cookie` header value, sorted by name
    ///
    /// Names must be HTTP tokens. Bytes a cookie value may not contain are
    /// dropped, and values containing a space or comma are quoted.
    pub(crate) fn cookie_header(&self) -> Response<Option<String>> {
        if self.cookies.is_empty() {
            return Ok(None);
        }

        let mut cookies: Vec<_> = self.cookies.iter().collect();
        cookies.sort();

        let mut pairs = Vec::with_capacity(cookies.len());
        for (name, value) in cookies {
            if !is_cookie_name(name) {
                return Err(Error::build(format!("invalid cookie name `{}`", name)));
            }
            pairs.push(format!("{}={}", name, sanitize_cookie_value(value)));
        }

        Ok(Some(pairs.join("; ")))
    }
}

fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

fn sanitize_cookie_value(value: &str) -> String {
    let value: String = value
        .chars()
        .filter(|c| matches!(*c, ' '..='~') && !matches!(*c, '"' | ';' | '\\'))
        .collect();

    if value.contains([' ', ',']) {
        format!("\"{}\"", value)
    } else {
        value
    }
}
