//! Tower middleware layers for [`HyperTransport`](crate::HyperTransport).
//!
//! Layers wrap the wire-level service, so they see every request the
//! dispatcher sends, token exchanges and retries included.
//!
//! # Example
//!
//! ```ignore
//! use courier::HyperTransport;
//! use courier::middleware::{ConcurrencyLimitLayer, LogLevel};
//!
//! let transport = HyperTransport::builder()
//!     .with_logging_level(LogLevel::Raw)
//!     .layer(ConcurrencyLimitLayer::new(8))
//!     .build();
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};
pub(crate) use logging::redact_headers;

pub use tower::ServiceBuilder;
pub use tower::limit::ConcurrencyLimitLayer;
