//! Sending requests and the refresh-and-retry protocol.

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::{Error, Request, Response, Result, StatusClass, decode_json, refresh};

/// How many times a dispatch exchanges the client secret and retries after a
/// 401 or 403.
pub const MAX_REFRESH_ATTEMPTS: u32 = 1;

const SERVICE_ERROR: &str = "service responded with error";

impl Request {
    /// Send the request once and decode the response.
    ///
    /// - 2xx with a body: decoded with the configured key strategy and the
    ///   request's date strategy.
    /// - 2xx without a body: [`Response`] with no model.
    /// - anything else: [`Error::Http`] carrying the status and raw body.
    ///
    /// No credential refresh happens here, see [`Request::dispatch`].
    pub async fn send<T: DeserializeOwned>(&self) -> Result<Response<T>> {
        let config = self
            .config()
            .ok_or_else(|| Error::configuration("configuration is not provided"))?;
        let level = config.log_level();

        if let Some(reason) = self.body_error() {
            if config.strict_body_encoding() {
                return Err(Error::BodyEncoding(reason.to_string()));
            }
            if level.is_enabled() {
                warn!(error = reason, "sending request without its body");
            }
        }

        let wire = self.to_wire()?;
        if level.is_raw() {
            debug!(request = ?self, "sending");
        }

        let (status, _headers, body) = config.transport().send(wire).await?.into_parts();

        if level.is_raw() {
            debug!(status, body = %String::from_utf8_lossy(&body), "received");
        }

        if !StatusClass::of(status).is_ok() {
            return Err(if body.is_empty() {
                Error::http(status, SERVICE_ERROR)
            } else {
                Error::http_with_body(status, SERVICE_ERROR, body)
            });
        }

        if body.is_empty() {
            return Ok(Response::new(None, status));
        }

        let model = decode_json(
            &body,
            config.key_decoding_strategy(),
            self.date_decoding_strategy(),
        )
        .inspect_err(|err| {
            if level.is_raw() {
                debug!(error = %err, "failed to decode response");
            }
        })?;

        Ok(Response::new(Some(model), status))
    }

    /// Send the request and return the decoded model.
    ///
    /// A 401 or 403 triggers one token exchange when the configuration has a
    /// client secret and the current credential is not a user's. The request
    /// is then retried once with the new token and the retry's outcome is
    /// returned. When the exchange fails the original error is returned.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let items: Option<Items> = client
    ///     .get("/items", Some(&QuerystringState::new().with("status", "open")))
    ///     .authenticate(client.credentials().as_ref())
    ///     .dispatch()
    ///     .await?;
    /// ```
    pub async fn dispatch<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let config = self
            .config()
            .cloned()
            .ok_or_else(|| Error::configuration("configuration is not provided"))?;
        let level = config.log_level();

        if level.is_enabled() {
            info!(request = %self, "dispatching");
        }

        let observed = config.refresh_gate.generation();
        let mut request = self;
        let mut attempts = 0;

        loop {
            let outcome = request.send::<T>().await;
            match outcome {
                Ok(response) => {
                    if level.is_enabled() {
                        info!(
                            status = response.status,
                            path = request.url().map_or("", url::Url::path),
                            "request succeeded"
                        );
                    }
                    return Ok(response.into_model());
                }
                Err(err)
                    if attempts < MAX_REFRESH_ATTEMPTS && refresh::is_eligible(&config, &err) =>
                {
                    attempts += 1;
                    let Some(credentials) = refresh::refresh_credentials(&config, observed).await
                    else {
                        return Err(err);
                    };
                    request = request.authenticate(Some(&credentials));
                }
                Err(err) => {
                    if level.is_enabled() {
                        warn!(request = %request, error = %err, "request failed");
                    }
                    return Err(err);
                }
            }
        }
    }
}
