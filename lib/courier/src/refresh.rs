//! Client-credential token refresh.
//!
//! Requests that fail with 401 or 403 while the client holds a
//! client-issued token exchange the configured secret for a new token. The
//! exchange runs under a per-configuration gate, so requests failing
//! together share a single exchange.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    Configuration, ContentType, Credentials, Error, KeyEncodingStrategy, Method, Request,
};

/// Serializes token exchanges of one configuration.
///
/// `generation` counts completed exchanges; the mutex holds the credential
/// the last one returned.
#[derive(Debug, Default)]
pub(crate) struct RefreshGate {
    latest: Mutex<Option<Credentials>>,
    generation: AtomicU64,
}

impl RefreshGate {
    /// Number of successful exchanges so far.
    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// Whether `error` may be recovered by exchanging the client secret.
pub(crate) fn is_eligible(config: &Configuration, error: &Error) -> bool {
    error.class().is_auth_failure()
        && config.client_credentials().is_some()
        && !config
            .credentials()
            .is_some_and(|credentials| credentials.is_user_credential)
}

/// Get a fresh client credential.
///
/// `observed` is the gate generation seen before the failed request was
/// sent. When another request completed an exchange since then, its
/// credential is reused instead of exchanging again.
pub(crate) async fn refresh_credentials(
    config: &Arc<Configuration>,
    observed: u64,
) -> Option<Credentials> {
    let gate = &config.refresh_gate;
    let mut latest = gate.latest.lock().await;

    if gate.generation() != observed
        && let Some(credentials) = latest.as_ref()
    {
        if config.log_level().is_enabled() {
            info!("reusing token from concurrent refresh");
        }
        return Some(credentials.clone());
    }

    let credentials = exchange(config).await?;

    if let Some(provider) = config.credentials_provider() {
        provider.set_credentials(credentials.clone());
    }
    *latest = Some(credentials.clone());
    gate.generation.fetch_add(1, Ordering::AcqRel);

    Some(credentials)
}

/// Send the token exchange request.
async fn exchange(config: &Arc<Configuration>) -> Option<Credentials> {
    let secret = config.client_credentials()?;
    let log = config.log_level().is_enabled();

    if log {
        info!(client_id = secret.client_id(), "fetching new token");
    }

    let url = match config.token_url() {
        Ok(url) => url,
        Err(err) => {
            if log {
                warn!(error = %err, "token exchange failed");
            }
            return None;
        }
    };

    let request = Request::new(Some(url))
        .set_method(Method::Post)
        .set_content_type(ContentType::Form)
        .set_body(secret, KeyEncodingStrategy::UseDefaultKeys, None)
        .set_accept_json()
        .set_config(Arc::clone(config));

    match request.send::<Credentials>().await {
        Ok(response) => {
            let credentials = response.into_model();
            if log {
                if credentials.is_some() {
                    info!("received new token");
                } else {
                    warn!("token exchange returned no credentials");
                }
            }
            credentials
        }
        Err(err) => {
            if log {
                warn!(error = %err, "token exchange failed");
            }
            None
        }
    }
}
