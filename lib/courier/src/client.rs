//! Client factory.
//!
//! [`Client`] resolves endpoints against the configured base URL and
//! returns [`Request`]s ready to dispatch.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    Configuration, ContentType, Credentials, DateStrategy, KeyEncodingStrategy, Method,
    QuerystringState, Request,
};

/// Encoding options for [`Client::post`] and [`Client::put`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyOptions {
    /// Body content type.
    pub content_type: ContentType,
    /// How model keys are written to JSON bodies.
    pub key_encoding_strategy: KeyEncodingStrategy,
    /// How dates are written to JSON bodies, RFC 3339 when unset.
    pub date_encoding_strategy: Option<DateStrategy>,
}

impl BodyOptions {
    /// Form-encoded body.
    #[must_use]
    pub fn form() -> Self {
        Self {
            content_type: ContentType::Form,
            ..Self::default()
        }
    }

    /// Set the key encoding strategy.
    #[must_use]
    pub const fn key_encoding_strategy(mut self, strategy: KeyEncodingStrategy) -> Self {
        self.key_encoding_strategy = strategy;
        self
    }

    /// Set the date encoding strategy.
    #[must_use]
    pub fn date_encoding_strategy(mut self, strategy: DateStrategy) -> Self {
        self.date_encoding_strategy = Some(strategy);
        self
    }
}

/// Request factory implemented by [`Client`].
///
/// Code written against this trait can be handed a substitute in tests.
pub trait ClientProvider {
    /// `GET` request accepting JSON, with `query` merged into the URL.
    fn get(&self, endpoint: &str, query: Option<&QuerystringState>) -> Request;

    /// `POST` request with `model` as body.
    fn post<M: Serialize + ?Sized>(
        &self,
        model: &M,
        endpoint: &str,
        options: &BodyOptions,
    ) -> Request;

    /// `PUT` request with `model` as body.
    fn put<M: Serialize + ?Sized>(
        &self,
        model: &M,
        endpoint: &str,
        options: &BodyOptions,
    ) -> Request;

    /// `DELETE` request accepting JSON, with `query` merged into the URL.
    fn delete(&self, endpoint: &str, query: Option<&QuerystringState>) -> Request;

    /// `POST` request with a JSON body and default options.
    fn post_json<M: Serialize + ?Sized>(&self, model: &M, endpoint: &str) -> Request {
        self.post(model, endpoint, &BodyOptions::default())
    }

    /// `PUT` request with a JSON body and default options.
    fn put_json<M: Serialize + ?Sized>(&self, model: &M, endpoint: &str) -> Request {
        self.put(model, endpoint, &BodyOptions::default())
    }
}

/// Typed HTTP client.
///
/// Cheap to clone; clones share the configuration, including its
/// credentials and refresh state.
///
/// # Example
///
/// ```ignore
/// use courier::prelude::*;
///
/// #[derive(Debug, Deserialize)]
/// struct Items {
///     item_count: u32,
/// }
///
/// let client = Client::new(Configuration::builder("https://api.example.com/".parse()?).build());
///
/// let items: Option<Items> = client
///     .get("/items", Some(&QuerystringState::new().with("status", "open")))
///     .dispatch()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    configuration: Arc<Configuration>,
}

impl Client {
    /// Create a client.
    #[must_use]
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration: Arc::new(configuration),
        }
    }

    /// Shared configuration.
    #[must_use]
    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }

    /// Current credential from the configured provider.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        self.configuration.credentials()
    }

    /// `GET` request accepting JSON, with `query` merged into the URL.
    #[must_use]
    pub fn get(&self, endpoint: &str, query: Option<&QuerystringState>) -> Request {
        self.endpoint(endpoint)
            .set_query_if_needed(query)
            .set_method(Method::Get)
            .set_accept_json()
            .set_config(Arc::clone(&self.configuration))
    }

    /// `POST` request with `model` as body.
    #[must_use]
    pub fn post<M: Serialize + ?Sized>(
        &self,
        model: &M,
        endpoint: &str,
        options: &BodyOptions,
    ) -> Request {
        self.with_body(Method::Post, model, endpoint, options)
    }

    /// `POST` request with a JSON body and default options.
    #[must_use]
    pub fn post_json<M: Serialize + ?Sized>(&self, model: &M, endpoint: &str) -> Request {
        self.post(model, endpoint, &BodyOptions::default())
    }

    /// `PUT` request with `model` as body.
    #[must_use]
    pub fn put<M: Serialize + ?Sized>(
        &self,
        model: &M,
        endpoint: &str,
        options: &BodyOptions,
    ) -> Request {
        self.with_body(Method::Put, model, endpoint, options)
    }

    /// `PUT` request with a JSON body and default options.
    #[must_use]
    pub fn put_json<M: Serialize + ?Sized>(&self, model: &M, endpoint: &str) -> Request {
        self.put(model, endpoint, &BodyOptions::default())
    }

    /// `DELETE` request accepting JSON, with `query` merged into the URL.
    #[must_use]
    pub fn delete(&self, endpoint: &str, query: Option<&QuerystringState>) -> Request {
        self.endpoint(endpoint)
            .set_query_if_needed(query)
            .set_method(Method::Delete)
            .set_accept_json()
            .set_config(Arc::clone(&self.configuration))
    }

    /// Bare `GET` request for `endpoint`, without configuration attached.
    #[must_use]
    pub fn endpoint(&self, endpoint: &str) -> Request {
        Request::new(self.configuration.resolve(endpoint))
    }

    fn with_body<M: Serialize + ?Sized>(
        &self,
        method: Method,
        model: &M,
        endpoint: &str,
        options: &BodyOptions,
    ) -> Request {
        self.endpoint(endpoint)
            .set_method(method)
            .set_content_type(options.content_type)
            .set_body(
                model,
                options.key_encoding_strategy,
                options.date_encoding_strategy.as_ref(),
            )
            .set_accept_json()
            .set_config(Arc::clone(&self.configuration))
    }
}

impl ClientProvider for Client {
    fn get(&self, endpoint: &str, query: Option<&QuerystringState>) -> Request {
        Self::get(self, endpoint, query)
    }

    fn post<M: Serialize + ?Sized>(
        &self,
        model: &M,
        endpoint: &str,
        options: &BodyOptions,
    ) -> Request {
        Self::post(self, model, endpoint, options)
    }

    fn put<M: Serialize + ?Sized>(
        &self,
        model: &M,
        endpoint: &str,
        options: &BodyOptions,
    ) -> Request {
        Self::put(self, model, endpoint, options)
    }

    fn delete(&self, endpoint: &str, query: Option<&QuerystringState>) -> Request {
        Self::delete(self, endpoint, query)
    }
}

impl From<Configuration> for Client {
    fn from(configuration: Configuration) -> Self {
        Self::new(configuration)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde::Serialize;

    use super::*;
    use crate::{Transport, TransportFuture, WireRequest};

    struct Unreachable;

    impl Transport for Unreachable {
        fn send(&self, _request: WireRequest) -> TransportFuture<'_> {
            Box::pin(async { Err(crate::Error::connection("unreachable")) })
        }
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct NewItem {
        display_name: String,
    }

    fn client() -> Client {
        let base = url::Url::parse("https://api.example.com/").expect("valid url");
        Client::new(Configuration::builder(base).transport(Unreachable).build())
    }

    #[test]
    fn get_builds_query_and_accept() {
        let query = QuerystringState::new().with("status", "open");
        let request = client().get("/items", Some(&query));

        check!(request.method() == Method::Get);
        check!(request.header("accept") == Some("application/json"));
        check!(request.config().is_some());
        let_assert!(Some(url) = request.url());
        check!(url.as_str() == "https://api.example.com/items?status=open");
    }

    #[test]
    fn delete_without_query() {
        let request = client().delete("/items/7", None);

        check!(request.method() == Method::Delete);
        let_assert!(Some(url) = request.url());
        check!(url.as_str() == "https://api.example.com/items/7");
    }

    #[test]
    fn post_json_defaults_to_snake_case() {
        let item = NewItem {
            display_name: "Widget".to_string(),
        };
        let request = client().post_json(&item, "/items");

        check!(request.method() == Method::Post);
        check!(request.content_type() == Some(ContentType::Json));
        let_assert!(Some(body) = request.body());
        check!(body.as_ref() == br#"{"display_name":"Widget"}"#);
    }

    #[test]
    fn put_with_default_keys() {
        let item = NewItem {
            display_name: "Widget".to_string(),
        };
        let options =
            BodyOptions::default().key_encoding_strategy(KeyEncodingStrategy::UseDefaultKeys);
        let request = client().put(&item, "/items/1", &options);

        check!(request.method() == Method::Put);
        let_assert!(Some(body) = request.body());
        check!(body.as_ref() == br#"{"displayName":"Widget"}"#);
    }

    #[test]
    fn post_form() {
        let request = client().post(
            &[("grant_type", "client_credentials")],
            "/login",
            &BodyOptions::form(),
        );

        check!(request.content_type() == Some(ContentType::Form));
        let_assert!(Some(body) = request.body());
        check!(body.as_ref() == b"grant_type=client_credentials");
    }

    #[test]
    fn endpoint_has_no_config() {
        let request = client().endpoint("/items");
        check!(request.config().is_none());
        check!(request.method() == Method::Get);
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let result = client().get("/items", None).dispatch::<serde_json::Value>().await;
        let_assert!(Err(err) = result);
        check!(err.is_connection());
    }

    /// Builds requests against a fixed host without any configuration.
    struct Offline;

    impl ClientProvider for Offline {
        fn get(&self, endpoint: &str, query: Option<&QuerystringState>) -> Request {
            Request::parse(&format!("http://offline.test{endpoint}"))
                .set_query_if_needed(query)
                .set_accept_json()
        }

        fn post<M: Serialize + ?Sized>(
            &self,
            model: &M,
            endpoint: &str,
            options: &BodyOptions,
        ) -> Request {
            Request::parse(&format!("http://offline.test{endpoint}"))
                .set_method(Method::Post)
                .set_content_type(options.content_type)
                .set_body(model, options.key_encoding_strategy, None)
        }

        fn put<M: Serialize + ?Sized>(
            &self,
            model: &M,
            endpoint: &str,
            options: &BodyOptions,
        ) -> Request {
            Request::parse(&format!("http://offline.test{endpoint}"))
                .set_method(Method::Put)
                .set_content_type(options.content_type)
                .set_body(model, options.key_encoding_strategy, None)
        }

        fn delete(&self, endpoint: &str, query: Option<&QuerystringState>) -> Request {
            self.get(endpoint, query).set_method(Method::Delete)
        }
    }

    fn open_items<C: ClientProvider>(provider: &C) -> Request {
        provider.get("/items", Some(&QuerystringState::new().with("status", "open")))
    }

    fn rename<C: ClientProvider>(provider: &C) -> Request {
        provider.put_json(
            &NewItem {
                display_name: "Widget".to_string(),
            },
            "/items/1",
        )
    }

    #[test]
    fn provider_can_be_substituted() {
        let real = open_items(&client());
        let_assert!(Some(url) = real.url());
        check!(url.as_str() == "https://api.example.com/items?status=open");
        check!(real.config().is_some());

        let offline = open_items(&Offline);
        let_assert!(Some(url) = offline.url());
        check!(url.as_str() == "http://offline.test/items?status=open");
        check!(offline.config().is_none());
    }

    #[test]
    fn provider_json_shorthands_use_default_options() {
        for request in [rename(&client()), rename(&Offline)] {
            check!(request.method() == Method::Put);
            let_assert!(Some(body) = request.body());
            check!(body.as_ref() == br#"{"display_name":"Widget"}"#);
        }
    }

    #[test]
    fn clones_share_configuration() {
        let client = client();
        let other = client.clone();
        check!(Arc::ptr_eq(client.configuration(), other.configuration()));
    }
}
