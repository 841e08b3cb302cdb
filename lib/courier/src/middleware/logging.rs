//! Wire-level logging middleware.
//!
//! Logs each [`WireRequest`] sent by the transport with the `tracing` crate.
//! Authorization headers are always redacted.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Error, RawResponse, Result, WireRequest};

const REDACTED: &str = "<redacted>";

/// How much the client logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log nothing.
    None,
    /// Log one line per request and per refresh.
    #[default]
    Normal,
    /// Also log headers, body sizes and decoding failures.
    Raw,
}

impl LogLevel {
    /// Whether anything is logged at all.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether headers and body details are logged.
    #[must_use]
    pub const fn is_raw(self) -> bool {
        matches!(self, Self::Raw)
    }
}

/// Replace the value of credential-bearing headers.
pub(crate) fn redact_headers(headers: &HashMap<String, String>) -> HashMap<&str, &str> {
    headers
        .iter()
        .map(|(name, value)| {
            if name.eq_ignore_ascii_case("authorization") {
                (name.as_str(), REDACTED)
            } else {
                (name.as_str(), value.as_str())
            }
        })
        .collect()
}

/// Layer that adds request/response logging.
///
/// # Example
///
/// ```ignore
/// use courier::middleware::{LogLevel, LoggingLayer};
/// use courier::HyperTransport;
///
/// let transport = HyperTransport::builder()
///     .layer(LoggingLayer::with_level(LogLevel::Raw))
///     .build();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

impl LoggingLayer {
    /// Create a new logging layer at [`LogLevel::Normal`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging layer at the given level.
    #[must_use]
    pub const fn with_level(level: LogLevel) -> Self {
        Self { level }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs requests and responses.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Logging<S> {
    /// Create a new logging service wrapping the given service.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            level: LogLevel::Normal,
        }
    }
}

impl<S> Service<WireRequest> for Logging<S>
where
    S: Service<WireRequest, Response = RawResponse, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = RawResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: WireRequest) -> Self::Future {
        let level = self.level;
        // Take the service that was polled ready, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if !level.is_enabled() {
            return Box::pin(async move { inner.call(request).await });
        }

        let method = request.method();
        let url = request.url().to_string();
        let span = span!(Level::INFO, "http_request", %method, %url);

        Box::pin(
            async move {
                let start = Instant::now();

                if level.is_raw() {
                    debug!(
                        headers = ?redact_headers(request.headers()),
                        body_len = request.body().map_or(0, bytes::Bytes::len),
                        "sending request"
                    );
                } else {
                    info!("sending request");
                }

                let result = inner.call(request).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) => {
                        let status = response.status();
                        if response.is_success() {
                            info!(status, elapsed_ms, "request completed");
                        } else {
                            warn!(status, elapsed_ms, "request failed with HTTP error");
                        }
                        if level.is_raw() {
                            debug!(
                                headers = ?response.headers(),
                                body_len = response.body().len(),
                                "received response"
                            );
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, elapsed_ms, "request failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
