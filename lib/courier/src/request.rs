//! Immutable request builder.
//!
//! Every builder method consumes the [`Request`] and returns the updated
//! value; clone a request to branch it. A request whose URL could not be
//! resolved ignores every chained call and fails with
//! [`Error::InvalidUrl`] when sent.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use url::Url;

use crate::middleware::redact_headers;
use crate::{
    BodyPlacement, Configuration, ContentType, Credentials, DateStrategy, Error,
    KeyEncodingStrategy, Method, QuerystringState, Result, WireRequest, encode_json, to_form,
};

const CONTENT_TYPE: &str = "Content-Type";
const ACCEPT: &str = "Accept";
const AUTHORIZATION: &str = "Authorization";

/// An HTTP request being built.
///
/// # Example
///
/// ```
/// use courier::{ContentType, Method, QuerystringState, Request};
///
/// let request = Request::parse("https://api.example.com/items")
///     .set_method(Method::Get)
///     .set_query_if_needed(Some(&QuerystringState::new().with("status", "open")))
///     .set_accept_json();
///
/// assert_eq!(request.to_string(), "[GET] /items status=open");
/// ```
#[derive(Clone, Default)]
pub struct Request {
    url: Option<Url>,
    method: Method,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
    body_error: Option<String>,
    date_decoding_strategy: Option<DateStrategy>,
    config: Option<Arc<Configuration>>,
}

impl Request {
    /// Create a `GET` request for `url`; `None` yields an invalid request.
    #[must_use]
    pub fn new(url: Option<Url>) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }

    /// Create a request from a URL string.
    #[must_use]
    pub fn parse(url: &str) -> Self {
        Self::new(Url::parse(url).ok())
    }

    /// Wrap an already assembled wire request.
    #[must_use]
    pub fn from_wire(request: WireRequest) -> Self {
        let (method, url, headers, body) = request.into_parts();
        Self {
            url: Some(url),
            method,
            headers,
            body,
            ..Self::default()
        }
    }

    /// Set a header, replacing any header with the same name in any case.
    #[must_use]
    pub fn set_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if self.url.is_none() {
            return self;
        }
        let key = key.into();
        self.headers.retain(|name, _| !name.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
        self
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn set_method(mut self, method: Method) -> Self {
        if self.url.is_some() {
            self.method = method;
        }
        self
    }

    /// Merge `state` into the query of the URL; `None` leaves it unchanged.
    ///
    /// Keys in `state` override existing ones, new keys are appended.
    /// The whole query is re-encoded: keys without a value stay bare, and
    /// a `+` in the existing query is written back as `%20`.
    #[must_use]
    pub fn set_query_if_needed(mut self, state: Option<&QuerystringState>) -> Self {
        let Some(state) = state else {
            return self;
        };

        if let Some(url) = self.url.as_mut() {
            let merged = QuerystringState::parse(url.query().unwrap_or_default()).merge(state);
            if merged.is_empty() {
                url.set_query(None);
            } else {
                url.set_query(Some(&merged.to_string()));
            }
        }
        self
    }

    /// Attach `model` according to the current method and content type.
    ///
    /// - `POST`/`PUT`: JSON or form body, depending on `Content-Type`; no
    ///   body without a content type.
    /// - `GET`/`DELETE`: the model fields are merged into the query string.
    /// - other methods: unchanged.
    ///
    /// Encoding failures leave the request without a body. The failure is
    /// kept and reported when the request is sent.
    #[must_use]
    pub fn set_body<M: Serialize + ?Sized>(
        self,
        model: &M,
        keys: KeyEncodingStrategy,
        dates: Option<&DateStrategy>,
    ) -> Self {
        if self.url.is_none() {
            return self;
        }

        match self.method.body_placement() {
            Some(BodyPlacement::Body) => match self.content_type() {
                Some(ContentType::Json) => self.with_encoded_body(encode_json(model, keys, dates)),
                Some(ContentType::Form) => self.with_encoded_body(to_form(model)),
                None => self,
            },
            Some(BodyPlacement::Query) => match QuerystringState::from_model(model) {
                Ok(state) => self.set_query_if_needed(Some(&state)),
                Err(err) => self.with_body_error(&err),
            },
            None => self,
        }
    }

    fn with_encoded_body(mut self, encoded: Result<Bytes>) -> Self {
        match encoded {
            Ok(bytes) => {
                self.body = Some(bytes);
                self.body_error = None;
                self
            }
            Err(err) => {
                self.body = None;
                self.with_body_error(&err)
            }
        }
    }

    fn with_body_error(mut self, err: &Error) -> Self {
        self.body_error = Some(err.to_string());
        self
    }

    /// Set the `Content-Type` header.
    #[must_use]
    pub fn set_content_type(self, content_type: ContentType) -> Self {
        self.set_header(CONTENT_TYPE, content_type.as_str())
    }

    /// Set `Accept: application/json`.
    #[must_use]
    pub fn set_accept_json(self) -> Self {
        self.set_header(ACCEPT, ContentType::Json.as_str())
    }

    /// Set the bearer token from `credentials`; `None` leaves the request unchanged.
    #[must_use]
    pub fn authenticate(self, credentials: Option<&Credentials>) -> Self {
        match credentials {
            Some(credentials) => self.set_header(AUTHORIZATION, credentials.bearer()),
            None => self,
        }
    }

    /// Set the bearer token.
    #[must_use]
    pub fn authenticate_with_token(self, token: &str) -> Self {
        self.set_header(AUTHORIZATION, format!("Bearer {token}"))
    }

    /// Attach the configuration needed to send the request.
    ///
    /// Also attached to invalid requests, so that sending them reports the
    /// bad URL rather than a missing configuration.
    #[must_use]
    pub fn set_config(mut self, config: Arc<Configuration>) -> Self {
        self.config = Some(config);
        self
    }

    /// Decode dates in the response with `strategy`.
    #[must_use]
    pub fn set_date_decoding_strategy(mut self, strategy: DateStrategy) -> Self {
        if self.url.is_some() {
            self.date_decoding_strategy = Some(strategy);
        }
        self
    }

    /// Target URL, `None` for an invalid request.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// All headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Header value by name, case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Encoded body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Why the last attached model could not be encoded.
    #[must_use]
    pub fn body_error(&self) -> Option<&str> {
        self.body_error.as_deref()
    }

    /// Content type from the `Content-Type` header, if it is one we encode.
    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        self.header(CONTENT_TYPE).and_then(ContentType::from_header)
    }

    /// Date strategy used to decode the response.
    #[must_use]
    pub const fn date_decoding_strategy(&self) -> Option<&DateStrategy> {
        self.date_decoding_strategy.as_ref()
    }

    /// Attached configuration.
    #[must_use]
    pub fn config(&self) -> Option<&Arc<Configuration>> {
        self.config.as_ref()
    }

    /// Assemble the request handed to the transport.
    pub fn to_wire(&self) -> Result<WireRequest> {
        let url = self
            .url
            .clone()
            .ok_or_else(|| Error::invalid_url("request has no valid URL"))?;

        Ok(WireRequest::new(
            self.method,
            url,
            self.headers.clone(),
            self.body.clone(),
        ))
    }

    pub(crate) fn bearer_token(&self) -> Option<&str> {
        self.header(AUTHORIZATION)
            .and_then(|value| value.strip_prefix("Bearer "))
    }
}

impl fmt::Display for Request {
    /// `[METHOD] /path query`, followed by a redacted token when authenticated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(url) = &self.url else {
            return f.write_str("invalid");
        };

        write!(f, "[{}] {}", self.method, url.path())?;
        if let Some(query) = url.query() {
            write!(f, " {query}")?;
        }
        if self.header(AUTHORIZATION).is_some() {
            f.write_str(" Bearer <redacted>")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("method", &self.method)
            .field("headers", &redact_headers(&self.headers))
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .field("body_error", &self.body_error)
            .field("date_decoding_strategy", &self.date_decoding_strategy)
            .field("has_config", &self.config.is_some())
            .finish()
    }
}
