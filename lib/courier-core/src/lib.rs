//! Core types for the courier typed HTTP client.
//!
//! This crate holds everything that does not perform I/O:
//! - [`Method`] - HTTP method enum
//! - [`QuerystringState`] - ordered query string mapping with merge
//! - [`encode_json`], [`decode_json`], [`to_form`] - body codecs with key and date strategies
//! - [`date`] - serde helpers for [`DateStrategy`]-driven date fields
//! - [`Credentials`], [`ClientCredentials`], [`CredentialsProvider`], [`CredentialsStore`]
//! - [`Transport`] - the "send a request, get a response" seam
//! - [`WireRequest`], [`RawResponse`], [`Response`] - request and response types
//! - [`Error`], [`Result`] and [`StatusClass`] - error handling

mod codec;
mod credentials;
pub mod date;
mod error;
mod method;
pub mod prelude;
mod querystring;
mod response;
mod status;
mod transport;
mod wire;

pub use codec::{
    ContentType, KeyDecodingStrategy, KeyEncodingStrategy, decode_json, encode_json, from_json,
    to_camel_case, to_form, to_json, to_snake_case,
};
pub use credentials::{ClientCredentials, Credentials, CredentialsProvider, CredentialsStore};
pub use date::DateStrategy;
pub use error::{Error, Result};
pub use method::{BodyPlacement, Method};
pub use querystring::QuerystringState;
pub use response::{RawResponse, Response};
pub use status::StatusClass;
pub use transport::{Transport, TransportFuture};
pub use wire::WireRequest;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
