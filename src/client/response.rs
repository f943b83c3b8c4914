//! Response outcome

use crate::codec::Codec;
use crate::error::{HttpError, Result};
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

/// Status, headers, final address and body of a completed request
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Vec<u8>,
}

impl Response {
    pub(crate) const fn new(
        status: StatusCode,
        headers: HeaderMap,
        url: Url,
        body: Vec<u8>,
    ) -> Self {
        Self {
            status,
            headers,
            url,
            body,
        }
    }

    /// Status code
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Canonical reason phrase for the status, empty if unknown
    #[must_use]
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Response headers
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Final address, after redirects
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Body bytes
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Take the body bytes
    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body as text, replacing invalid UTF-8
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body with `codec`
    ///
    /// # Errors
    ///
    /// See [`Codec::decode`].
    pub fn decode<T: DeserializeOwned>(&self, codec: &Codec) -> Result<T> {
        codec.decode(&self.body)
    }

    /// Turn a non-2xx response into [`HttpError::Status`]
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Status`] unless the status is 2xx.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpError::Status {
                status: self.status.as_u16(),
                reason: self.reason().to_string(),
            })
        }
    }
}
