//! Typed HTTP client with fluent immutable requests.
//!
//! Build a [`Request`] from a [`Client`], chain its configuration and
//! [`dispatch`](Request::dispatch) it to get a decoded model back. When the
//! service answers 401 or 403 and a client secret is configured, the client
//! exchanges the secret for a new token and retries once.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use courier::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! struct Items {
//!     item_count: u32,
//! }
//!
//! let store = Arc::new(CredentialsStore::new());
//! let config = Configuration::builder("https://api.example.com/".parse()?)
//!     .credentials_provider(store.clone())
//!     .client_credentials(ClientCredentials::new("app", "s3cret"))
//!     .build();
//! let client = Client::new(config);
//!
//! let items: Option<Items> = client
//!     .get("/items", Some(&QuerystringState::new().with("status", "open")))
//!     .authenticate(client.credentials().as_ref())
//!     .dispatch()
//!     .await?;
//! ```

mod client;
mod config;
mod dispatch;
pub mod middleware;
pub mod prelude;
mod refresh;
mod request;
mod transport;

pub use client::{BodyOptions, Client, ClientProvider};
pub use config::{Configuration, ConfigurationBuilder, DEFAULT_TOKEN_PATH};
pub use dispatch::MAX_REFRESH_ATTEMPTS;
pub use middleware::LogLevel;
pub use request::Request;
pub use transport::{
    BoxedService, HyperTransport, HyperTransportBuilder, ServiceFuture, TransportConfig,
    TransportConfigBuilder, https_connector,
};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use courier_core::{
    BodyPlacement, ClientCredentials, ContentType, Credentials, CredentialsProvider,
    CredentialsStore, DateStrategy, Error, KeyDecodingStrategy, KeyEncodingStrategy, Method,
    QuerystringState, RawResponse, Response, Result, StatusClass, Transport, TransportFuture,
    WireRequest, date, decode_json, encode_json, from_json, to_camel_case, to_form, to_json,
    to_snake_case,
};

// Re-export http types for status codes and headers
pub use courier_core::{StatusCode, header};

pub use url;
