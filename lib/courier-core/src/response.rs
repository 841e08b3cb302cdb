//! HTTP response types.
//!
//! - [`RawResponse`] - what a transport hands back: status, headers, body bytes
//! - [`Response`] - the outcome of a successful send: decoded model and status

use std::collections::HashMap;

use bytes::Bytes;

use crate::StatusClass;

/// HTTP response with status, headers, and body, as returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl RawResponse {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Status classification.
    #[must_use]
    pub const fn class(&self) -> StatusClass {
        StatusClass::of(self.status)
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, Bytes) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}

/// Decoded outcome of a successful send.
///
/// `model` is `None` when the service answered 2xx with an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<T> {
    /// Decoded body.
    pub model: Option<T>,
    /// HTTP status code.
    pub status: u16,
}

impl<T> Response<T> {
    /// Creates a new response.
    #[must_use]
    pub const fn new(model: Option<T>, status: u16) -> Self {
        Self { model, status }
    }

    /// Status classification.
    #[must_use]
    pub const fn class(&self) -> StatusClass {
        StatusClass::of(self.status)
    }

    /// Consume into the decoded model.
    #[must_use]
    pub fn into_model(self) -> Option<T> {
        self.model
    }

    /// Transform the model with a function.
    pub fn map<F, U>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            model: self.model.map(f),
            status: self.status,
        }
    }
}
