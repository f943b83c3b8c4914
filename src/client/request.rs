//! Request descriptor
//!
//! A [`Request`] is validated once, by [`RequestBuilder::build`], and is
//! immutable afterwards. Malformed addresses, methods and headers surface as
//! typed errors instead of aborting.

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::{HttpError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use std::time::Duration;

/// One HTTP request: address, method, optional body, headers and timeout
#[derive(Debug, Clone)]
pub struct Request {
    url: Url,
    method: Method,
    body: Option<Vec<u8>>,
    headers: HeaderMap,
    timeout: Duration,
}

impl Request {
    /// Start building a request for `url`
    pub fn builder(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(url)
    }

    /// `GET url` with default headers and timeout
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if `url` is not an absolute http(s) URL.
    pub fn get(url: impl Into<String>) -> Result<Self> {
        RequestBuilder::new(url).build()
    }

    /// `POST url` with `body`
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if `url` is not an absolute http(s) URL.
    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Result<Self> {
        RequestBuilder::new(url).method("POST").body(body).build()
    }

    /// Target address
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP method
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Request body, if any
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Request headers
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Time allowed for the whole request, from connect to last body byte
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for [`Request`]; all validation happens in [`RequestBuilder::build`]
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    url: String,
    method: String,
    body: Option<Vec<u8>>,
    headers: Vec<(String, String)>,
    timeout: Duration,
}

impl RequestBuilder {
    /// New builder: `GET`, no body, no headers, 60 second timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET.as_str().to_string(),
            body: None,
            headers: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// HTTP method, e.g. `"PUT"`
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Request body
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a header; a later value for the same name (case-insensitive) wins
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add every header in `headers`
    #[must_use]
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate and freeze the request
    ///
    /// # Errors
    ///
    /// - [`HttpError::InvalidUrl`] for an unparsable, relative or non-http(s) address
    /// - [`HttpError::InvalidMethod`] for a method that is not an HTTP token
    /// - [`HttpError::InvalidHeader`] for a bad header name or value
    /// - [`HttpError::InvalidArgument`] for a zero timeout
    pub fn build(self) -> Result<Request> {
        let url = parse_url(&self.url)?;

        let method = Method::from_bytes(self.method.as_bytes())
            .map_err(|_| HttpError::InvalidMethod(self.method.clone()))?;

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| HttpError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| HttpError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let _ = headers.insert(header_name, header_value);
        }

        if self.timeout.is_zero() {
            return Err(HttpError::InvalidArgument(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(Request {
            url,
            method,
            body: self.body,
            headers,
            timeout: self.timeout,
        })
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| HttpError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HttpError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = Request::get("https://example.com/status").unwrap();
        assert_eq!(*request.method(), Method::GET);
        assert_eq!(request.timeout(), Duration::from_secs(60));
        assert!(request.body().is_none());
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_malformed_url_is_an_error() {
        let err = Request::get("not a url").unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl { .. }));
    }

    #[test]
    fn test_relative_url_is_an_error() {
        assert!(Request::get("/api/v1/status").is_err());
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = Request::get("ftp://example.com/file").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn test_invalid_method() {
        let err = Request::builder("http://example.com")
            .method("BAD METHOD")
            .build()
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidMethod(_)));
    }

    #[test]
    fn test_custom_method_is_allowed() {
        let request = Request::builder("http://example.com")
            .method("PURGE")
            .build()
            .unwrap();
        assert_eq!(request.method().as_str(), "PURGE");
    }

    #[test]
    fn test_header_names_are_unique() {
        let request = Request::builder("http://example.com")
            .header("X-Trace", "first")
            .header("x-trace", "second")
            .header("Accept", "application/json")
            .build()
            .unwrap();
        assert_eq!(request.headers().len(), 2);
        assert_eq!(request.headers()["x-trace"], "second");
    }

    #[test]
    fn test_invalid_header_value() {
        let err = Request::builder("http://example.com")
            .header("X-Bad", "line\nbreak")
            .build()
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidHeader { name, .. } if name == "X-Bad"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Request::builder("http://example.com")
            .timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidArgument(_)));
    }

    #[test]
    fn test_post_carries_body() {
        let request = Request::post("http://example.com/items", b"{}".to_vec()).unwrap();
        assert_eq!(*request.method(), Method::POST);
        assert_eq!(request.body(), Some(&b"{}"[..]));
    }
}
