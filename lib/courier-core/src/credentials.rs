//! Bearer credentials and where they are kept.
//!
//! - [`Credentials`] - an access token and whether a user or the client owns it
//! - [`ClientCredentials`] - the machine-to-machine secret exchanged for a token
//! - [`CredentialsProvider`] - get/set access to the current credential
//! - [`CredentialsStore`] - in-memory [`CredentialsProvider`]

use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// An access token sent as `Authorization: Bearer <token>`.
///
/// Token exchange responses decode into this type with either
/// `access_token` or `accessToken` keys; `is_user_credential` defaults to
/// `false` since exchanged tokens belong to the client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// The bearer token.
    #[serde(alias = "accessToken")]
    pub access_token: String,
    /// `true` when a user signed in for this token, `false` for client-issued tokens.
    #[serde(default, alias = "isUserCredential")]
    pub is_user_credential: bool,
}

impl Credentials {
    /// Credentials issued to a signed-in user. These are never refreshed automatically.
    #[must_use]
    pub fn user(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            is_user_credential: true,
        }
    }

    /// Credentials issued to the client itself.
    #[must_use]
    pub fn client(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            is_user_credential: false,
        }
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("is_user_credential", &self.is_user_credential)
            .finish()
    }
}

/// Client-credential grant, sent form-encoded to the token endpoint.
///
/// # Example
///
/// ```
/// use courier_core::{ClientCredentials, to_form};
///
/// let secret = ClientCredentials::new("app", "s3cret").with_scope("items:read");
/// let body = to_form(&secret).expect("serialize");
/// assert_eq!(
///     body.as_ref(),
///     b"grant_type=client_credentials&client_id=app&client_secret=s3cret&scope=items%3Aread"
/// );
/// ```
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ClientCredentials {
    grant_type: String,
    client_id: String,
    client_secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
}

impl ClientCredentials {
    /// Grant type sent by [`ClientCredentials::new`].
    pub const GRANT_TYPE: &'static str = "client_credentials";

    /// Create a `client_credentials` grant.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            grant_type: Self::GRANT_TYPE.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: None,
        }
    }

    /// Request a scope with the token.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Grant type.
    #[must_use]
    pub fn grant_type(&self) -> &str {
        &self.grant_type
    }

    /// Client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Requested scope.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Source of the credential attached to outgoing requests.
///
/// Implementations are shared between concurrent requests, so both methods
/// take `&self`. A refresh overwrites the stored credential with
/// [`set_credentials`](Self::set_credentials).
pub trait CredentialsProvider: Send + Sync {
    /// Current credential, if any.
    fn provide_credentials(&self) -> Option<Credentials>;

    /// Replace the current credential.
    fn set_credentials(&self, credentials: Credentials);
}

/// In-memory [`CredentialsProvider`] behind a read/write lock.
#[derive(Default)]
pub struct CredentialsStore {
    current: RwLock<Option<Credentials>>,
}

impl CredentialsStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `credentials`.
    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            current: RwLock::new(Some(credentials)),
        }
    }

    /// Forget the current credential.
    pub fn clear(&self) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl CredentialsProvider for CredentialsStore {
    fn provide_credentials(&self) -> Option<Credentials> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_credentials(&self, credentials: Credentials) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials);
    }
}

impl fmt::Debug for CredentialsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsStore")
            .field("current", &self.provide_credentials())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn credentials_decode_from_token_response() {
        let credentials: Credentials =
            crate::from_json(br#"{"access_token":"abc","token_type":"bearer","expires_in":3600}"#)
                .expect("decode");
        assert_eq!(credentials, Credentials::client("abc"));

        let credentials: Credentials =
            crate::from_json(br#"{"accessToken":"abc"}"#).expect("decode camel");
        assert!(!credentials.is_user_credential);
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let debug = format!("{:?}", Credentials::user("top-secret"));
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("is_user_credential: true"));

        let debug = format!("{:?}", ClientCredentials::new("app", "hunter2"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("app"));
    }

    #[test]
    fn bearer_header_value() {
        assert_eq!(Credentials::client("t0k3n").bearer(), "Bearer t0k3n");
    }

    #[test]
    fn client_credentials_form() {
        let body = crate::to_form(&ClientCredentials::new("app", "s3cret")).expect("form");
        assert_eq!(
            body.as_ref(),
            b"grant_type=client_credentials&client_id=app&client_secret=s3cret"
        );
    }

    #[test]
    fn store_get_set_clear() {
        let store = CredentialsStore::new();
        assert!(store.provide_credentials().is_none());

        store.set_credentials(Credentials::client("first"));
        store.set_credentials(Credentials::client("second"));
        assert_eq!(
            store.provide_credentials(),
            Some(Credentials::client("second"))
        );

        store.clear();
        assert!(store.provide_credentials().is_none());
    }

    #[test]
    fn store_is_shared_across_threads() {
        let store = Arc::new(CredentialsStore::with_credentials(Credentials::client("0")));

        let handles: Vec<_> = (1..=4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.set_credentials(Credentials::client(i.to_string())))
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }

        let token = store.provide_credentials().expect("credentials").access_token;
        assert!(["1", "2", "3", "4"].contains(&token.as_str()));
    }
}
