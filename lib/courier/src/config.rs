//! Client configuration.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::middleware::LogLevel;
use crate::refresh::RefreshGate;
use crate::{
    ClientCredentials, Credentials, CredentialsProvider, HyperTransport, KeyDecodingStrategy,
    Result, Transport,
};

/// Default path of the client-credential token exchange.
pub const DEFAULT_TOKEN_PATH: &str = "/auth/v1/oauth/tokens";

/// Settings shared by every request of a [`Client`](crate::Client).
///
/// Immutable once built; requests hold it behind an [`Arc`].
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use courier::{ClientCredentials, Configuration, CredentialsStore};
///
/// let config = Configuration::builder("https://api.example.com/".parse()?)
///     .credentials_provider(Arc::new(CredentialsStore::new()))
///     .client_credentials(ClientCredentials::new("app", "s3cret"))
///     .build();
/// ```
pub struct Configuration {
    base_url: Url,
    credentials_provider: Option<Arc<dyn CredentialsProvider>>,
    client_credentials: Option<ClientCredentials>,
    transport: Arc<dyn Transport>,
    key_decoding_strategy: KeyDecodingStrategy,
    log_level: LogLevel,
    strict_body_encoding: bool,
    token_path: String,
    pub(crate) refresh_gate: RefreshGate,
}

impl Configuration {
    /// Start a configuration for `base_url`.
    #[must_use]
    pub fn builder(base_url: Url) -> ConfigurationBuilder {
        ConfigurationBuilder::new(base_url)
    }

    /// Base URL endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Where the current credential is kept.
    #[must_use]
    pub fn credentials_provider(&self) -> Option<&Arc<dyn CredentialsProvider>> {
        self.credentials_provider.as_ref()
    }

    /// Current credential held by the provider.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials_provider
            .as_ref()
            .and_then(|provider| provider.provide_credentials())
    }

    /// Secret exchanged for a fresh token on 401/403.
    #[must_use]
    pub fn client_credentials(&self) -> Option<&ClientCredentials> {
        self.client_credentials.as_ref()
    }

    /// Transport every request is sent through.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// How response keys are matched to model fields.
    #[must_use]
    pub const fn key_decoding_strategy(&self) -> KeyDecodingStrategy {
        self.key_decoding_strategy
    }

    /// Dispatcher log level.
    #[must_use]
    pub const fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Whether a body that failed to encode aborts the dispatch.
    #[must_use]
    pub const fn strict_body_encoding(&self) -> bool {
        self.strict_body_encoding
    }

    /// Path of the token exchange, relative to the base URL.
    #[must_use]
    pub fn token_path(&self) -> &str {
        &self.token_path
    }

    /// Resolve `endpoint` against the base URL.
    ///
    /// Absolute paths replace the base path; relative ones extend it.
    #[must_use]
    pub fn resolve(&self, endpoint: &str) -> Option<Url> {
        self.base_url.join(endpoint).ok()
    }

    /// URL of the token exchange.
    pub(crate) fn token_url(&self) -> Result<Url> {
        self.base_url
            .join(&self.token_path)
            .map_err(|e| crate::Error::invalid_url(format!("{}: {e}", self.token_path)))
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("base_url", &self.base_url.as_str())
            .field("has_credentials_provider", &self.credentials_provider.is_some())
            .field("client_credentials", &self.client_credentials)
            .field("key_decoding_strategy", &self.key_decoding_strategy)
            .field("log_level", &self.log_level)
            .field("strict_body_encoding", &self.strict_body_encoding)
            .field("token_path", &self.token_path)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Configuration`].
pub struct ConfigurationBuilder {
    base_url: Url,
    credentials_provider: Option<Arc<dyn CredentialsProvider>>,
    client_credentials: Option<ClientCredentials>,
    transport: Option<Arc<dyn Transport>>,
    key_decoding_strategy: KeyDecodingStrategy,
    log_level: LogLevel,
    strict_body_encoding: bool,
    token_path: String,
}

impl fmt::Debug for ConfigurationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationBuilder")
            .field("base_url", &self.base_url.as_str())
            .field("has_transport", &self.transport.is_some())
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

impl ConfigurationBuilder {
    fn new(base_url: Url) -> Self {
        Self {
            base_url,
            credentials_provider: None,
            client_credentials: None,
            transport: None,
            key_decoding_strategy: KeyDecodingStrategy::default(),
            log_level: LogLevel::default(),
            strict_body_encoding: false,
            token_path: DEFAULT_TOKEN_PATH.to_string(),
        }
    }

    /// Keep credentials in `provider`.
    #[must_use]
    pub fn credentials_provider(mut self, provider: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials_provider = Some(provider);
        self
    }

    /// Enable the token refresh with this client secret.
    #[must_use]
    pub fn client_credentials(mut self, credentials: ClientCredentials) -> Self {
        self.client_credentials = Some(credentials);
        self
    }

    /// Send requests through `transport` instead of a default [`HyperTransport`].
    #[must_use]
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set the key decoding strategy.
    #[must_use]
    pub const fn key_decoding_strategy(mut self, strategy: KeyDecodingStrategy) -> Self {
        self.key_decoding_strategy = strategy;
        self
    }

    /// Set the log level.
    #[must_use]
    pub const fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Fail the dispatch when the body could not be encoded.
    #[must_use]
    pub const fn strict_body_encoding(mut self, strict: bool) -> Self {
        self.strict_body_encoding = strict;
        self
    }

    /// Override the token exchange path.
    #[must_use]
    pub fn token_path(mut self, path: impl Into<String>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> Configuration {
        Configuration {
            base_url: self.base_url,
            credentials_provider: self.credentials_provider,
            client_credentials: self.client_credentials,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(HyperTransport::new())),
            key_decoding_strategy: self.key_decoding_strategy,
            log_level: self.log_level,
            strict_body_encoding: self.strict_body_encoding,
            token_path: self.token_path,
            refresh_gate: RefreshGate::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CredentialsStore, RawResponse, TransportFuture, WireRequest};

    struct NoContent;

    impl Transport for NoContent {
        fn send(&self, _request: WireRequest) -> TransportFuture<'_> {
            Box::pin(async {
                Ok(RawResponse::new(
                    204,
                    std::collections::HashMap::new(),
                    bytes::Bytes::new(),
                ))
            })
        }
    }

    fn base() -> Url {
        Url::parse("https://api.example.com/v1/").expect("valid url")
    }

    #[test]
    fn defaults() {
        let config = Configuration::builder(base()).transport(NoContent).build();

        assert_eq!(config.base_url().as_str(), "https://api.example.com/v1/");
        assert!(config.credentials_provider().is_none());
        assert!(config.client_credentials().is_none());
        assert_eq!(
            config.key_decoding_strategy(),
            KeyDecodingStrategy::UseDefaultKeys
        );
        assert_eq!(config.log_level(), LogLevel::Normal);
        assert!(!config.strict_body_encoding());
        assert_eq!(config.token_path(), DEFAULT_TOKEN_PATH);
    }

    #[test]
    fn token_url_resolves_against_host() {
        let config = Configuration::builder(base()).transport(NoContent).build();
        let url = config.token_url().expect("token url");
        assert_eq!(url.as_str(), "https://api.example.com/auth/v1/oauth/tokens");
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let config = Configuration::builder(base()).transport(NoContent).build();

        assert_eq!(
            config.resolve("items").map(String::from),
            Some("https://api.example.com/v1/items".to_string())
        );
        assert_eq!(
            config.resolve("/items").map(String::from),
            Some("https://api.example.com/items".to_string())
        );
    }

    #[test]
    fn credentials_come_from_provider() {
        let store = Arc::new(CredentialsStore::with_credentials(Credentials::user("t")));
        let config = Configuration::builder(base())
            .credentials_provider(store)
            .transport(NoContent)
            .build();

        assert_eq!(config.credentials(), Some(Credentials::user("t")));
    }

    #[test]
    fn debug_hides_secret() {
        let config = Configuration::builder(base())
            .client_credentials(ClientCredentials::new("app", "s3cret"))
            .transport(NoContent)
            .build();

        let debug = format!("{config:?}");
        assert!(debug.contains("app"));
        assert!(!debug.contains("s3cret"));
    }
}
