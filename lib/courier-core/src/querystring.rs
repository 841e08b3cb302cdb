//! Query string state.
//!
//! [`QuerystringState`] is an ordered mapping of key to one or more values.
//! It converts from and to the query component of a URL and merges with
//! override semantics.
//!
//! # Example
//!
//! ```
//! use courier_core::QuerystringState;
//!
//! let base = QuerystringState::parse("status=open&page=1");
//! let overrides = QuerystringState::new().with("page", "2").with("sort", "asc");
//!
//! let merged = base.merge(&overrides);
//! assert_eq!(merged.to_string(), "status=open&page=2&sort=asc");
//! ```

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::Result;

/// Everything but the RFC 3986 unreserved characters is escaped.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Ordered key to value(s) mapping for a URL query component.
///
/// Keys are unique: values parsed under a repeated key are collected in
/// order under the first occurrence of that key. A key never holds an empty
/// value list. Keys parsed without `=` (`?flag`) are written back bare.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerystringState {
    entries: Vec<(String, Vec<String>)>,
    bare: Vec<String>,
}

impl QuerystringState {
    /// Creates an empty state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            bare: Vec::new(),
        }
    }

    /// Parses a raw query string, with or without the leading `?`.
    ///
    /// Keys and values are percent-decoded, `+` decodes to a space.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut state = Self::new();
        for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
            for (key, value) in url::form_urlencoded::parse(pair.as_bytes()) {
                if !pair.contains('=') && !state.bare.iter().any(|k| *k == key) {
                    state.bare.push(key.to_string());
                }
                state.append(key, value);
            }
        }
        state
    }

    /// Builds a state from the fields of a serializable model.
    ///
    /// Sequences become repeated keys, `None` fields are skipped when the
    /// model asks for it with `skip_serializing_if`.
    pub fn from_model<T: serde::Serialize + ?Sized>(model: &T) -> Result<Self> {
        let raw = serde_html_form::to_string(model)?;
        Ok(Self::parse(&raw))
    }

    /// Returns the state with `key` set to a single `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key` to a single value, replacing any previous values in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert_all(key, [value.into()]);
    }

    /// Sets `key` to a list of values, replacing any previous values in place.
    ///
    /// An empty list removes the key.
    pub fn insert_all<I, V>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = key.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.bare.retain(|k| *k != key);
        if values.is_empty() {
            self.remove(&key);
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key, values)),
        }
    }

    /// Appends a value under `key`, keeping the values already there.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Removes `key`, returning its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.bare.retain(|k| k != key);
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// First value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// All values under `key`, in order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(&[], |(_, values)| values.as_slice())
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, values)| (k.as_str(), values.as_slice()))
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges `overrides` on top of `self`.
    ///
    /// Keys present in both take the override values at the position they
    /// had in `self`; keys only in `overrides` are appended in their order.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        for (key, values) in &overrides.entries {
            merged.insert_all(key.as_str(), values.iter().map(String::as_str));
            if overrides.bare.contains(key) {
                merged.bare.push(key.clone());
            }
        }
        merged
    }
}

impl fmt::Display for QuerystringState {
    /// Percent-encoded `key=value` pairs joined by `&`, empty for an empty state.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, values) in &self.entries {
            let bare = self.bare.contains(key);
            for value in values {
                if !first {
                    f.write_str("&")?;
                }
                first = false;
                write!(f, "{}", utf8_percent_encode(key, QUERY_COMPONENT))?;
                if !(bare && value.is_empty()) {
                    write!(f, "={}", utf8_percent_encode(value, QUERY_COMPONENT))?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for QuerystringState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl<K, V> FromIterator<(K, V)> for QuerystringState
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = Self::new();
        for (key, value) in iter {
            state.append(key, value);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn parse_simple_pairs() {
        let state = QuerystringState::parse("status=open&page=2");
        assert_eq!(state.len(), 2);
        assert_eq!(state.get("status"), Some("open"));
        assert_eq!(state.get("page"), Some("2"));
        assert_eq!(state.keys().collect::<Vec<_>>(), ["status", "page"]);
    }

    #[test]
    fn parse_strips_leading_question_mark() {
        let state = QuerystringState::parse("?q=rust");
        assert_eq!(state.get("q"), Some("rust"));
    }

    #[test]
    fn parse_collects_repeated_keys() {
        let state = QuerystringState::parse("tag=a&page=1&tag=b");
        assert_eq!(state.get_all("tag"), ["a", "b"]);
        assert_eq!(state.keys().collect::<Vec<_>>(), ["tag", "page"]);
    }

    #[test]
    fn parse_percent_decodes() {
        let state = QuerystringState::parse("q=hello%20world&name=a+b&sym=%26%3D");
        assert_eq!(state.get("q"), Some("hello world"));
        assert_eq!(state.get("name"), Some("a b"));
        assert_eq!(state.get("sym"), Some("&="));
    }

    #[test]
    fn valueless_keys_stay_bare() {
        let state = QuerystringState::parse("flag&empty=&page=1");
        check!(state.get("flag") == Some(""));
        check!(state.to_string() == "flag&empty=&page=1");

        let merged = state.merge(&QuerystringState::new().with("flag", "on"));
        check!(merged.to_string() == "flag=on&empty=&page=1");

        let kept = QuerystringState::parse("page=1").merge(&QuerystringState::parse("debug"));
        check!(kept.to_string() == "page=1&debug");
    }

    #[test]
    fn parse_empty_string() {
        assert!(QuerystringState::parse("").is_empty());
    }

    #[test]
    fn to_string_percent_encodes() {
        let state = QuerystringState::new()
            .with("q", "hello world")
            .with("filter", "a&b=c");
        assert_eq!(state.to_string(), "q=hello%20world&filter=a%26b%3Dc");
    }

    #[test]
    fn to_string_repeats_list_values_in_order() {
        let mut state = QuerystringState::new();
        state.insert_all("tag", ["x", "y", "z"]);
        assert_eq!(state.to_string(), "tag=x&tag=y&tag=z");
    }

    #[test]
    fn empty_state_is_empty_string() {
        assert_eq!(QuerystringState::new().to_string(), "");
    }

    #[test]
    fn merge_overrides_and_appends() {
        let base = QuerystringState::parse("a=1&b=2&c=3");
        let overrides = QuerystringState::parse("b=20&d=4");

        let merged = base.merge(&overrides);

        assert_eq!(merged.to_string(), "a=1&b=20&c=3&d=4");
        // Inputs are untouched
        assert_eq!(base.get("b"), Some("2"));
        assert_eq!(overrides.len(), 2);
    }

    #[test]
    fn merge_replaces_whole_value_list() {
        let base = QuerystringState::parse("tag=a&tag=b");
        let overrides = QuerystringState::new().with("tag", "c");
        assert_eq!(base.merge(&overrides).get_all("tag"), ["c"]);
    }

    #[test]
    fn merge_keys_are_union() {
        let base = QuerystringState::parse("x=1&y=2");
        let overrides = QuerystringState::parse("y=3&z=4");
        let merged = base.merge(&overrides);

        let keys: Vec<_> = merged.keys().collect();
        assert_eq!(keys, ["x", "y", "z"]);
        assert_eq!(merged.get("y"), Some("3"));
    }

    #[test]
    fn merge_with_empty() {
        let base = QuerystringState::parse("x=1");
        assert_eq!(base.merge(&QuerystringState::new()), base);
        assert_eq!(QuerystringState::new().merge(&base), base);
    }

    #[test]
    fn round_trip_through_encoding() {
        let mut state = QuerystringState::new()
            .with("status", "open")
            .with("q", "rust & serde")
            .with("path", "/a/b?c");
        state.insert_all("ids", ["1", "2"]);

        assert_eq!(QuerystringState::parse(&state.to_string()), state);
    }

    #[test]
    fn insert_all_empty_removes_key() {
        let mut state = QuerystringState::parse("a=1&b=2");
        state.insert_all("a", Vec::<String>::new());
        assert!(!state.contains_key("a"));
        assert_eq!(state.to_string(), "b=2");
    }

    #[test]
    fn from_model_uses_serde_names() {
        #[derive(serde::Serialize)]
        struct Filter {
            status: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            page: Option<u32>,
            tags: Vec<String>,
        }

        let state = QuerystringState::from_model(&Filter {
            status: "open".to_string(),
            page: None,
            tags: vec!["a".to_string(), "b".to_string()],
        })
        .expect("serialize");

        assert_eq!(state.get("status"), Some("open"));
        assert!(!state.contains_key("page"));
        assert_eq!(state.get_all("tags"), ["a", "b"]);
    }

    #[test]
    fn collect_from_pairs() {
        let state: QuerystringState = [("a", "1"), ("a", "2"), ("b", "3")].into_iter().collect();
        assert_eq!(state.to_string(), "a=1&a=2&b=3");
    }
}
