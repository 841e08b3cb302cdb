//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier::prelude::*;
//! ```

pub use crate::{
    BodyOptions, Client, ClientCredentials, ClientProvider, Configuration, ContentType,
    Credentials, CredentialsProvider, CredentialsStore, DateStrategy, Error, KeyDecodingStrategy,
    KeyEncodingStrategy, LogLevel, Method, QuerystringState, Request, Response, Result,
    StatusClass,
};
pub use serde::{Deserialize, Serialize};
