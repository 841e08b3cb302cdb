//! Body serialization utilities.
//!
//! JSON bodies go through an intermediate [`serde_json::Value`] so that the
//! key strategies can rewrite object keys on the way in and out. Form bodies
//! and query folding use `serde_html_form`.

use bytes::Bytes;
use serde_json::Value;

use crate::{DateStrategy, Error, Result, date};

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    #[default]
    Json,
    /// Form URL-encoded content type (`application/x-www-form-urlencoded`).
    Form,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
        }
    }

    /// Recognize a `Content-Type` header value, ignoring parameters such as `charset`.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        let mime = value.split(';').next().unwrap_or_default().trim();
        [Self::Json, Self::Form]
            .into_iter()
            .find(|content_type| mime.eq_ignore_ascii_case(content_type.as_str()))
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How model keys are written to outgoing JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyEncodingStrategy {
    /// Keys are written as the model serializes them.
    UseDefaultKeys,
    /// `camelCase` keys are written as `snake_case`.
    #[default]
    ConvertToSnakeCase,
}

/// How incoming JSON keys are matched to model fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyDecodingStrategy {
    /// Keys are handed to the model unchanged.
    #[default]
    UseDefaultKeys,
    /// `snake_case` keys are turned into `camelCase` before decoding.
    ConvertFromSnakeCase,
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use courier_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// let user = User { name: "Alice".to_string() };
/// let bytes = to_json(&user).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a value to JSON bytes with a key and an optional date strategy.
///
/// # Example
///
/// ```
/// use courier_core::{KeyEncodingStrategy, encode_json};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Page { item_count: u32 }
///
/// let bytes = encode_json(&Page { item_count: 3 }, KeyEncodingStrategy::ConvertToSnakeCase, None)
///     .expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"item_count":3}"#);
/// ```
pub fn encode_json<T: serde::Serialize + ?Sized>(
    model: &T,
    keys: KeyEncodingStrategy,
    dates: Option<&DateStrategy>,
) -> Result<Bytes> {
    date::with_strategy(dates, || match keys {
        KeyEncodingStrategy::UseDefaultKeys => to_json(model),
        KeyEncodingStrategy::ConvertToSnakeCase => {
            let value = convert_keys(serde_json::to_value(model)?, &to_snake_case);
            to_json(&value)
        }
    })
}

/// Serialize a value to form URL-encoded bytes.
///
/// Uses `serde_html_form` which supports `Vec<T>` for repeated form fields
/// (e.g., `tags=a&tags=b&tags=c`).
///
/// # Example
///
/// ```
/// use courier_core::to_form;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Login { grant_type: String }
///
/// let login = Login { grant_type: "client_credentials".to_string() };
/// let bytes = to_form(&login).expect("serialize");
/// assert_eq!(bytes.as_ref(), b"grant_type=client_credentials");
/// ```
pub fn to_form<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_html_form::to_string(value)
        .map(|s| Bytes::from(s.into_bytes()))
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so that the error names the field that failed
/// (e.g., "user.address.city").
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

/// Deserialize JSON bytes with a key and an optional date strategy.
pub fn decode_json<T: serde::de::DeserializeOwned>(
    bytes: &[u8],
    keys: KeyDecodingStrategy,
    dates: Option<&DateStrategy>,
) -> Result<T> {
    date::with_strategy(dates, || match keys {
        KeyDecodingStrategy::UseDefaultKeys => from_json(bytes),
        KeyDecodingStrategy::ConvertFromSnakeCase => {
            let value: Value = serde_json::from_slice(bytes)
                .map_err(|e| Error::json_deserialization("", e.to_string()))?;
            let value = convert_keys(value, &to_camel_case);
            serde_path_to_error::deserialize(value).map_err(|e| {
                Error::json_deserialization(e.path().to_string(), e.inner().to_string())
            })
        }
    })
}

/// Rewrite every object key, recursively.
fn convert_keys(value: Value, convert: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (convert(&key), convert_keys(value, convert)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|value| convert_keys(value, convert))
                .collect(),
        ),
        other => other,
    }
}

/// Split leading and trailing underscores off a key.
fn split_underscores(key: &str) -> (&str, &str, &str) {
    let trimmed = key.trim_start_matches('_');
    let (prefix, rest) = key.split_at(key.len() - trimmed.len());
    let core_len = rest.trim_end_matches('_').len();
    let (core, suffix) = rest.split_at(core_len);
    (prefix, core, suffix)
}

/// `camelCase` to `snake_case`; acronym runs stay together (`myURLValue` -> `my_url_value`).
///
/// Leading and trailing underscores are kept.
#[must_use]
pub fn to_snake_case(key: &str) -> String {
    let (prefix, core, suffix) = split_underscores(key);
    let chars: Vec<char> = core.chars().collect();

    let mut out = String::with_capacity(key.len() + 4);
    out.push_str(prefix);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p));
            let next = chars.get(i + 1);
            let boundary = prev.is_some_and(|&p| {
                p != '_'
                    && (p.is_lowercase()
                        || p.is_ascii_digit()
                        || (p.is_uppercase() && next.is_some_and(|n| n.is_lowercase())))
            });
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out.push_str(suffix);
    out
}

/// `snake_case` to `camelCase`; the first word is kept as is.
///
/// Leading and trailing underscores are kept, keys without an inner
/// underscore are returned unchanged.
#[must_use]
pub fn to_camel_case(key: &str) -> String {
    let (prefix, core, suffix) = split_underscores(key);
    if !core.contains('_') {
        return key.to_string();
    }

    let mut words = core.split('_').filter(|word| !word.is_empty());
    let mut out = String::with_capacity(key.len());
    out.push_str(prefix);
    if let Some(first) = words.next() {
        out.push_str(first);
    }
    for word in words {
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out.push_str(suffix);
    out
}
