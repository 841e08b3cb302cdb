//! The transport seam.
//!
//! A [`Transport`] sends one [`WireRequest`] and hands back the raw response.
//! The dispatcher owns everything above that: encoding, status handling,
//! decoding and the credential refresh. Implement it to plug in another HTTP
//! stack or a scripted transport for tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{RawResponse, Result, WireRequest};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<RawResponse>> + Send + 'a>>;

/// Sends a request and returns the response.
///
/// Any status code is a successful send; only failures to get a response at
/// all (connection, TLS, timeout) are errors. Transports are shared by every
/// request of a client, so they must be `Send + Sync`.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use bytes::Bytes;
/// use courier_core::{RawResponse, Transport, TransportFuture, WireRequest};
///
/// struct Teapot;
///
/// impl Transport for Teapot {
///     fn send(&self, _request: WireRequest) -> TransportFuture<'_> {
///         Box::pin(async { Ok(RawResponse::new(418, HashMap::new(), Bytes::new())) })
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Send `request`, waiting for the full response body.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn send(&self, request: WireRequest) -> TransportFuture<'_>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: WireRequest) -> TransportFuture<'_> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: WireRequest) -> TransportFuture<'_> {
        (**self).send(request)
    }
}
