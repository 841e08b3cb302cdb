//! Date (de)serialization driven by a per-call [`DateStrategy`].
//!
//! Model fields opt in with `#[serde(with = "courier_core::date")]` (or
//! `courier_core::date::option` for optional dates). The strategy handed to
//! [`encode_json`](crate::encode_json) or [`decode_json`](crate::decode_json)
//! is active for the duration of that call; outside of such a call dates are
//! written and read as RFC 3339 strings.
//!
//! # Example
//!
//! ```
//! use chrono::{DateTime, Utc};
//! use courier_core::{DateStrategy, KeyEncodingStrategy, encode_json};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Event {
//!     #[serde(with = "courier_core::date")]
//!     at: DateTime<Utc>,
//! }
//!
//! let event = Event { at: DateTime::from_timestamp(1_700_000_000, 0).expect("valid") };
//! let bytes = encode_json(
//!     &event,
//!     KeyEncodingStrategy::UseDefaultKeys,
//!     Some(&DateStrategy::SecondsSince1970),
//! )
//! .expect("encode");
//! assert_eq!(bytes.as_ref(), br#"{"at":1700000000}"#);
//! ```

use std::cell::RefCell;
use std::fmt::{self, Write as _};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::de::{self, Unexpected, Visitor};
use serde::{Deserializer, Serializer, ser};

/// How dates are written to and read from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DateStrategy {
    /// RFC 3339 / ISO 8601 strings.
    #[default]
    Iso8601,
    /// Whole seconds since the Unix epoch; fractional numbers are accepted when reading.
    SecondsSince1970,
    /// Milliseconds since the Unix epoch.
    MillisecondsSince1970,
    /// A `chrono` format string, e.g. `%Y-%m-%d`. Dates are formatted in UTC.
    Formatted(String),
}

thread_local! {
    static ACTIVE: RefCell<Option<DateStrategy>> = const { RefCell::new(None) };
}

struct Restore(Option<DateStrategy>);

impl Drop for Restore {
    fn drop(&mut self) {
        let previous = self.0.take();
        ACTIVE.with(|active| *active.borrow_mut() = previous);
    }
}

/// Run `f` with `strategy` active on this thread.
pub(crate) fn with_strategy<R>(strategy: Option<&DateStrategy>, f: impl FnOnce() -> R) -> R {
    let previous = ACTIVE.with(|active| active.replace(strategy.cloned()));
    let _restore = Restore(previous);
    f()
}

fn active() -> DateStrategy {
    ACTIVE
        .with(|active| active.borrow().clone())
        .unwrap_or_default()
}

/// Serialize a date with the active strategy.
pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    match active() {
        DateStrategy::Iso8601 => {
            serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        DateStrategy::SecondsSince1970 => serializer.serialize_i64(date.timestamp()),
        DateStrategy::MillisecondsSince1970 => serializer.serialize_i64(date.timestamp_millis()),
        DateStrategy::Formatted(format) => {
            let mut rendered = String::new();
            write!(rendered, "{}", date.format(&format)).map_err(|_| {
                <S::Error as ser::Error>::custom(format_args!("invalid date format `{format}`"))
            })?;
            serializer.serialize_str(&rendered)
        }
    }
}

/// Deserialize a date with the active strategy.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    deserializer.deserialize_any(DateVisitor(active()))
}

/// Same as the parent module, for `Option<DateTime<Utc>>` fields.
pub mod option {
    use std::fmt;

    use chrono::{DateTime, Utc};
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    /// Serialize an optional date with the active strategy.
    pub fn serialize<S: Serializer>(
        date: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => super::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional date with the active strategy.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        deserializer.deserialize_option(OptionVisitor)
    }

    struct OptionVisitor;

    impl<'de> Visitor<'de> for OptionVisitor {
        type Value = Option<DateTime<Utc>>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an optional date")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            super::deserialize(deserializer).map(Some)
        }
    }
}

struct DateVisitor(DateStrategy);

impl Visitor<'_> for DateVisitor {
    type Value = DateTime<Utc>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            DateStrategy::Iso8601 => f.write_str("an RFC 3339 date string"),
            DateStrategy::SecondsSince1970 => f.write_str("seconds since 1970"),
            DateStrategy::MillisecondsSince1970 => f.write_str("milliseconds since 1970"),
            DateStrategy::Formatted(format) => write!(f, "a date formatted as `{format}`"),
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        match &self.0 {
            DateStrategy::Iso8601 => DateTime::parse_from_rfc3339(v)
                .map(|date| date.with_timezone(&Utc))
                .map_err(E::custom),
            DateStrategy::Formatted(format) => parse_formatted(v, format).map_err(E::custom),
            DateStrategy::SecondsSince1970 | DateStrategy::MillisecondsSince1970 => {
                Err(E::invalid_type(Unexpected::Str(v), &self))
            }
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        let date = match &self.0 {
            DateStrategy::SecondsSince1970 => DateTime::from_timestamp(v, 0),
            DateStrategy::MillisecondsSince1970 => DateTime::from_timestamp_millis(v),
            DateStrategy::Iso8601 | DateStrategy::Formatted(_) => {
                return Err(E::invalid_type(Unexpected::Signed(v), &self));
            }
        };
        date.ok_or_else(|| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let v = i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))?;
        self.visit_i64(v)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        let millis = match &self.0 {
            DateStrategy::SecondsSince1970 => (v * 1000.0).round(),
            DateStrategy::MillisecondsSince1970 => v.round(),
            DateStrategy::Iso8601 | DateStrategy::Formatted(_) => {
                return Err(E::invalid_type(Unexpected::Float(v), &self));
            }
        };
        if !millis.is_finite() {
            return Err(E::invalid_value(Unexpected::Float(v), &self));
        }
        DateTime::from_timestamp_millis(millis as i64)
            .ok_or_else(|| E::invalid_value(Unexpected::Float(v), &self))
    }
}

/// Parse with a format that may or may not carry an offset or a time.
fn parse_formatted(v: &str, format: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(date) = DateTime::parse_from_str(v, format) {
        return Ok(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(v, format) {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(v, format).map(|day| day.and_time(NaiveTime::MIN).and_utc())
}
