//! HTTP client wrapper

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::RequestConfiguration;
use crate::error::Error;
use crate::executor;
use crate::method::Method;
use crate::options::RequestOption;
use crate::response::Response;

/// HTTP client handle
///
/// Cloning is cheap and clones share the underlying connection pool, so one
/// client can be built at start-up and handed to every caller.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Create a new HTTP client builder
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create an HttpClient from a reqwest::Client
    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self { inner: client }
    }

    /// GET `url`, decoding the JSON response into `R`
    pub async fn get<R, I>(&self, url: &str, options: I) -> Response<R>
    where
        R: DeserializeOwned,
        I: IntoIterator<Item = RequestOption>,
    {
        self.execute(Method::Get, url, options).await
    }

    /// POST to `url`, decoding the JSON response into `R`
    pub async fn post<R, I>(&self, url: &str, options: I) -> Response<R>
    where
        R: DeserializeOwned,
        I: IntoIterator<Item = RequestOption>,
    {
        self.execute(Method::Post, url, options).await
    }

    /// PUT to `url`, decoding the JSON response into `R`
    pub async fn put<R, I>(&self, url: &str, options: I) -> Response<R>
    where
        R: DeserializeOwned,
        I: IntoIterator<Item = RequestOption>,
    {
        self.execute(Method::Put, url, options).await
    }

    /// DELETE `url`, decoding the JSON response into `R`
    pub async fn delete<R, I>(&self, url: &str, options: I) -> Response<R>
    where
        R: DeserializeOwned,
        I: IntoIterator<Item = RequestOption>,
    {
        self.execute(Method::Delete, url, options).await
    }

    /// Apply `options`, send the request and decode the JSON response into `R`
    ///
    /// # Errors
    ///
    /// * [`ErrorKind::Build`](crate::ErrorKind::Build) if the URL, a header or a cookie is invalid
    /// * [`ErrorKind::Transport`](crate::ErrorKind::Transport) if no response was received
    /// * [`ErrorKind::Status`](crate::ErrorKind::Status) if the status is outside `200..300`,
    ///   carrying the status code and raw body
    /// * [`ErrorKind::Decode`](crate::ErrorKind::Decode) if a successful body is not valid JSON for `R`
    #[instrument(skip(self, options))]
    pub async fn execute<R, I>(&self, method: Method, url: &str, options: I) -> Response<R>
    where
        R: DeserializeOwned,
        I: IntoIterator<Item = RequestOption>,
    {
        let config = RequestConfiguration::from_options(options);
        tracing::trace!(
            "Applied {} headers, {} parameters, {} cookies",
            config.headers.len(),
            config.parameters.len(),
            config.cookies.len()
        );

        let request = executor::build_request(&self.inner, method, url, config)?;
        executor::send(&self.inner, request).await
    }
}

/// HTTP client builder for timeout, default header and proxy settings
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: Vec<(String, String)>,
    proxy: Option<ProxyConfig>,
}

#[derive(Debug)]
struct ProxyConfig {
    url: url::Url,
    matcher: Option<regex::Regex>,
}

impl HttpClientBuilder {
    /// Limit every request made by the client to `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the `User-Agent` sent with every request
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Send a header with every request unless a request option sets it
    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((key.into(), value.into()));
        self
    }

    /// Set a proxy URL
    pub fn proxy(mut self, url: url::Url) -> Self {
        self.proxy = Some(ProxyConfig { url, matcher: None });
        self
    }

    /// Set a proxy URL with a host pattern matcher
    pub fn proxy_with_matcher(mut self, url: url::Url, pattern: &str) -> Response<Self> {
        let matcher = regex::Regex::new(pattern)
            .map_err(|e| Error::config(format!("invalid proxy pattern: {}", e)))?;
        self.proxy = Some(ProxyConfig {
            url,
            matcher: Some(matcher),
        });
        Ok(self)
    }

    /// Build the HTTP client
    pub fn build(self) -> Response<HttpClient> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        if !self.default_headers.is_empty() {
            let mut headers = HeaderMap::with_capacity(self.default_headers.len());
            for (key, value) in self.default_headers {
                let name = HeaderName::from_bytes(key.as_bytes())
                    .map_err(|e| Error::config(format!("invalid default header: {}", e)))?;
                let value = HeaderValue::from_str(&value)
                    .map_err(|e| Error::config(format!("invalid default header: {}", e)))?;
                headers.insert(name, value);
            }
            builder = builder.default_headers(headers);
        }

        if let Some(proxy_config) = self.proxy {
            let proxy_url = proxy_config.url.to_string();
            let proxy = if let Some(matcher) = proxy_config.matcher {
                reqwest::Proxy::custom(move |url| {
                    if matcher.is_match(url.host_str().unwrap_or("")) {
                        Some(proxy_url.clone())
                    } else {
                        None
                    }
                })
            } else {
                reqwest::Proxy::all(&proxy_url)
                    .map_err(|e| Error::config(format!("invalid proxy: {}", e)))?
            };
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::config(format!("failed to build client: {}", e)))?;
        Ok(HttpClient { inner: client })
    }
}

/// GET `url` with a one-off default client
pub async fn get<R, I>(url: &str, options: I) -> Response<R>
where
    R: DeserializeOwned,
    I: IntoIterator<Item = RequestOption>,
{
    HttpClient::new().get(url, options).await
}

/// POST to `url` with a one-off default client
pub async fn post<R, I>(url: &str, options: I) -> Response<R>
where
    R: DeserializeOwned,
    I: IntoIterator<Item = RequestOption>,
{
    HttpClient::new().post(url, options).await
}

/// PUT to `url` with a one-off default client
pub async fn put<R, I>(url: &str, options: I) -> Response<R>
where
    R: DeserializeOwned,
    I: IntoIterator<Item = RequestOption>,
{
    HttpClient::new().put(url, options).await
}

/// DELETE `url` with a one-off default client
pub async fn delete<R, I>(url: &str, options: I) -> Response<R>
where
    R: DeserializeOwned,
    I: IntoIterator<Item = RequestOption>,
{
    HttpClient::new().delete(url, options).await
}
