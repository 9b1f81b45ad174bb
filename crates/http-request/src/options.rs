//! Request options
//!
//! An option is a mutation applied to a [`RequestConfiguration`] before the
//! request is built. Options run in the order they are passed, so a later
//! option overwrites an earlier one when both write the same key.

use std::time::Duration;

use serde::Serialize;

use crate::config::RequestConfiguration;
use crate::error::Error;
use crate::response::Response;

const CONTENT_TYPE: &str = "Content-Type";
const ACCEPT: &str = "Accept";
const AUTHORIZATION: &str = "Authorization";
const APPLICATION_JSON: &str = "application/json";

/// A single mutation of a [`RequestConfiguration`]
pub struct RequestOption {
    inner: Box<dyn FnOnce(&mut RequestConfiguration) + Send + 'static>,
}

impl std::fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOption").finish_non_exhaustive()
    }
}

impl RequestOption {
    /// Wrap a custom mutation
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut RequestConfiguration) + Send + 'static,
    {
        Self { inner: Box::new(f) }
    }

    /// Apply the mutation
    pub fn apply(self, config: &mut RequestConfiguration) {
        (self.inner)(config)
    }
}

/// Set a header, replacing any previous value for `key`
pub fn with_header(key: impl Into<String>, value: impl Into<String>) -> RequestOption {
    let (key, value) = (key.into(), value.into());
    RequestOption::new(move |config| config.set_header(key, value))
}

/// Set several headers, replacing previous values for the same keys
pub fn with_headers<I, K, V>(headers: I) -> RequestOption
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let headers: Vec<(String, String)> = headers
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    RequestOption::new(move |config| {
        for (key, value) in headers {
            config.set_header(key, value);
        }
    })
}

/// Ask for a JSON response (`Accept: application/json`)
pub fn with_accept() -> RequestOption {
    with_header(ACCEPT, APPLICATION_JSON)
}

/// Send `Authorization: Bearer <token>`
pub fn with_bearer_auth(token: impl AsRef<str>) -> RequestOption {
    with_header(AUTHORIZATION, format!("Bearer {}", token.as_ref()))
}

/// Serialize `body` as the JSON request payload
///
/// Also sets `Content-Type: application/json`. If `body` cannot be serialized
/// the configuration is left untouched and the request is sent without a
/// body; use [`try_with_body`] to get the serialization error instead.
pub fn with_body<T>(body: &T) -> RequestOption
where
    T: Serialize + ?Sized,
{
    match serde_json::to_vec(body) {
        Ok(bytes) => json_body(bytes),
        Err(err) => {
            tracing::debug!("Skipping request body, serialization failed: {}", err);
            RequestOption::new(|_| {})
        }
    }
}

/// Serialize `body` as the JSON request payload, failing on serialization errors
pub fn try_with_body<T>(body: &T) -> Response<RequestOption>
where
    T: Serialize + ?Sized,
{
    serde_json::to_vec(body)
        .map(json_body)
        .map_err(Error::serialization)
}

fn json_body(bytes: Vec<u8>) -> RequestOption {
    RequestOption::new(move |config| {
        config.body = Some(bytes);
        config.set_header(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
    })
}

/// Set a query parameter, replacing any previous value for `key`
///
/// The value is percent-encoded when the request is built.
pub fn with_parameter(key: impl Into<String>, value: impl Into<String>) -> RequestOption {
    let (key, value) = (key.into(), value.into());
    RequestOption::new(move |config| {
        config.parameters.insert(key, value);
    })
}

/// Set several query parameters, replacing previous values for the same keys
pub fn with_parameters<I, K, V>(parameters: I) -> RequestOption
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let parameters: Vec<(String, String)> = parameters
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    RequestOption::new(move |config| config.parameters.extend(parameters))
}

/// Set a cookie, replacing any previous value for `name`
pub fn with_cookie(name: impl Into<String>, value: impl Into<String>) -> RequestOption {
    let (name, value) = (name.into(), value.into());
    RequestOption::new(move |config| {
        config.cookies.insert(name, value);
    })
}

/// Set several cookies, replacing previous values for the same names
pub fn with_cookies<I, K, V>(cookies: I) -> RequestOption
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let cookies: Vec<(String, String)> = cookies
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    RequestOption::new(move |config| config.cookies.extend(cookies))
}

/// Limit the whole request, from connect to the end of the body, to `timeout`
pub fn with_timeout(timeout: Duration) -> RequestOption {
    RequestOption::new(move |config| config.timeout = Some(timeout))
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use serde::ser::Error as _;
    use serde::Serializer;

    use super::*;
    use crate::error::ErrorKind;

    fn configure<const N: usize>(options: [RequestOption; N]) -> RequestConfiguration {
        RequestConfiguration::from_options(options)
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("not serializable"))
        }
    }

    #[test]
    fn test_with_header_last_write_wins() {
        let config = configure([with_header("X-Key", "v1"), with_header("X-Key", "v2")]);
        assert_eq!(config.headers.get("X-Key").map(String::as_str), Some("v2"));
    }

    #[test]
    fn test_with_headers_overwrites_each_key() {
        let config = configure([
            with_header("X-A", "old"),
            with_headers([("X-A", "new"), ("X-B", "b")]),
        ]);

        assert_eq!(config.headers.get("X-A").map(String::as_str), Some("new"));
        assert_eq!(config.headers.get("X-B").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_with_headers_accepts_maps() {
        let mut headers = HashMap::new();
        headers.insert("X-Map".to_string(), "value".to_string());

        let config = configure([with_headers(headers)]);
        assert_eq!(config.headers.get("X-Map").map(String::as_str), Some("value"));
    }

    #[test]
    fn test_with_accept() {
        let config = configure([with_accept()]);
        assert_eq!(
            config.headers.get("Accept").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_with_bearer_auth() {
        let config = configure([with_bearer_auth("secret")]);
        assert_eq!(
            config.headers.get("Authorization").map(String::as_str),
            Some("Bearer secret")
        );
    }

    #[test]
    fn test_with_body_sets_json_and_content_type() {
        let mut body = BTreeMap::new();
        body.insert("name", "test");

        let config = configure([with_body(&body)]);
        assert_eq!(config.body.as_deref(), Some(br#"{"name":"test"}"#.as_slice()));
        assert_eq!(
            config.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_with_header_after_body_overrides_content_type() {
        let config = configure([with_body(&1), with_header("content-type", "text/plain")]);
        assert_eq!(
            config.ordered_headers().last(),
            Some(&("content-type", "text/plain"))
        );
    }

    #[test]
    fn test_with_cookies_repeated_name_last_wins() {
        let config = configure([with_cookies([("session", "a"), ("session", "b")])]);
        assert_eq!(config.cookies.get("session").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_with_headers_repeated_key_last_wins() {
        let config = configure([with_headers([("X-Key", "a"), ("X-Key", "b")])]);
        assert_eq!(config.headers.get("X-Key").map(String::as_str), Some("b"));
        assert_eq!(config.ordered_headers(), vec![("X-Key", "b")]);
    }

    #[test]
    fn test_with_body_serialization_failure_leaves_config_untouched() {
        let config = configure([with_body(&Unserializable)]);
        assert!(config.body.is_none());
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_with_body_later_body_wins() {
        let config = configure([with_body(&1), with_body(&2)]);
        assert_eq!(config.body.as_deref(), Some(b"2".as_slice()));
    }

    #[test]
    fn test_try_with_body_success() {
        let option = try_with_body(&vec![1, 2, 3]).expect("Vec should serialize");
        let config = configure([option]);
        assert_eq!(config.body.as_deref(), Some(b"[1,2,3]".as_slice()));
    }

    #[test]
    fn test_try_with_body_failure() {
        let err = try_with_body(&Unserializable).expect_err("Serialization should fail");
        assert_eq!(err.kind(), ErrorKind::Serialization);
        assert_eq!(err.code(), 0);
        assert_eq!(err.message(), "failed to serialize request body");
    }

    #[test]
    fn test_with_parameter_is_not_escaped() {
        let config = configure([with_parameter("q", "a b&c")]);
        assert_eq!(config.parameters.get("q").map(String::as_str), Some("a b&c"));
    }

    #[test]
    fn test_with_parameters_overwrites_each_key() {
        let config = configure([
            with_parameter("page", "1"),
            with_parameters([("page", "2"), ("limit", "50")]),
        ]);

        assert_eq!(config.parameters.get("page").map(String::as_str), Some("2"));
        assert_eq!(config.parameters.get("limit").map(String::as_str), Some("50"));
    }

    #[test]
    fn test_with_cookie_and_cookies() {
        let config = configure([
            with_cookie("session", "old"),
            with_cookies([("session", "new"), ("theme", "dark")]),
        ]);

        assert_eq!(config.cookies.get("session").map(String::as_str), Some("new"));
        assert_eq!(config.cookies.get("theme").map(String::as_str), Some("dark"));
    }

    #[test]
    fn test_with_timeout() {
        let config = configure([with_timeout(Duration::from_secs(3))]);
        assert_eq!(config.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_custom_option() {
        let config = configure([RequestOption::new(|config| {
            config.body = Some(b"raw".to_vec());
        })]);
        assert_eq!(config.body.as_deref(), Some(b"raw".as_slice()));
    }
}
