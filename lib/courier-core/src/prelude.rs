//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier_core::prelude::*;
//! ```

pub use crate::{
    ClientCredentials, ContentType, Credentials, CredentialsProvider, CredentialsStore,
    DateStrategy, Error, KeyDecodingStrategy, KeyEncodingStrategy, Method, QuerystringState,
    Response, Result, StatusClass, Transport,
};
