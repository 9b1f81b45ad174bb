//! Request construction, dispatch and response decoding

use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde_path_to_error::Segment;
use url::{form_urlencoded, Url};

use crate::config::RequestConfiguration;
use crate::error::Error;
use crate::method::Method;
use crate::response::{is_success, Response};

/// Build the transport request for `method` and `url` from `config`
pub(crate) fn build_request(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    config: RequestConfiguration,
) -> Response<reqwest::Request> {
    let mut url = Url::parse(url).map_err(Error::build)?;
    encode_parameters(&mut url, &config.parameters);
    let headers = build_headers(&config)?;

    let mut builder = client.request(method.into(), url).headers(headers);
    if let Some(body) = config.body {
        builder = builder.body(body);
    }
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(Error::build)
}

/// Merge configured parameters into the URL query string
///
/// Pairs already in the URL are kept verbatim unless their key is configured.
/// Configured pairs are appended sorted by key.
fn encode_parameters(url: &mut Url, parameters: &HashMap<String, String>) {
    if parameters.is_empty() {
        return;
    }

    let existing = url
        .query()
        .map(|query| {
            query
                .split('&')
                .filter(|pair| !pair.is_empty())
                .filter(|pair| {
                    form_urlencoded::parse(pair.as_bytes())
                        .next()
                        .map_or(true, |(key, _)| !parameters.contains_key(key.as_ref()))
                })
                .collect::<Vec<_>>()
                .join("&")
        })
        .filter(|query| !query.is_empty());
    url.set_query(existing.as_deref());

    let mut configured: Vec<(&String, &String)> = parameters.iter().collect();
    configured.sort();
    url.query_pairs_mut().extend_pairs(configured);
}

fn build_headers(config: &RequestConfiguration) -> Response<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(config.headers.len() + 1);

    for (key, value) in config.ordered_headers() {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(Error::build)?;
        let value = HeaderValue::from_str(value).map_err(Error::build)?;
        headers.insert(name, value);
    }

    if let Some(cookies) = config.cookie_header()? {
        let cookies = match headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{}; {}", existing, cookies),
            None => cookies,
        };
        let value = HeaderValue::from_str(&cookies).map_err(Error::build)?;
        headers.insert(COOKIE, value);
    }

    Ok(headers)
}

/// Send `request` and decode a successful response into `T`
pub(crate) async fn send<T>(client: &reqwest::Client, request: reqwest::Request) -> Response<T>
where
    T: DeserializeOwned,
{
    let response = client.execute(request).await.map_err(|err| {
        tracing::debug!("Failed to send request: {}", err);
        Error::transport(err)
    })?;
    let status = response.status().as_u16();

    if !is_success(status) {
        let body = response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .unwrap_or_default();
        tracing::debug!("Request failed with status {} ({} bytes)", status, body.len());
        return Err(Error::status(status, body));
    }

    tracing::debug!("Request succeeded with status {}", status);
    let body = response
        .bytes()
        .await
        .map_err(|err| Error::decode(None, err))?;
    decode(&body)
}

/// Decode a JSON body into `T`
pub(crate) fn decode<T>(body: &[u8]) -> Response<T>
where
    T: DeserializeOwned,
{
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let field = mismatched_field(&err);
        tracing::debug!("Failed to decode response at {}: {}", err.path(), err.inner());
        Error::decode(field, err.into_inner())
    })?;
    deserializer.end().map_err(|err| Error::decode(None, err))?;
    Ok(value)
}

/// Path of the field whose JSON type did not match the target type
fn mismatched_field(err: &serde_path_to_error::Error<serde_json::Error>) -> Option<String> {
    let inner = err.inner();
    if inner.classify() != Category::Data {
        return None;
    }

    // serde_json only exposes the mismatch through the message text
    let message = inner.to_string();
    if !message.starts_with("invalid type") && !message.starts_with("invalid value") {
        return None;
    }

    let path = err.path();
    path.iter()
        .any(|segment| matches!(segment, Segment::Map { .. }))
        .then(|| path.to_string())
}
