//! Timestamp formats and serde field adapters
//!
//! Upstream payloads are inconsistent about fractional seconds, so decoding
//! tries an ordered list of formats while encoding always writes one format.
//! Annotate a field with `#[serde(with = "simple_http::codec::timestamp")]`
//! (or `timestamp::option` for `Option<DateTime<Utc>>`). The formats in effect
//! are those of the [`Codec`](super::Codec) running on the current thread, or
//! the defaults when the field is (de)serialized outside a codec.
//!
//! ```
//! use chrono::{DateTime, Utc};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Event {
//!     #[serde(with = "simple_http::codec::timestamp")]
//!     at: DateTime<Utc>,
//! }
//!
//! let event: Event = simple_http::codec::decode(br#"{"at":"2019-02-27T10:00:00.123+00:00"}"#)?;
//! let bytes = simple_http::codec::encode(&event)?;
//! assert_eq!(bytes, br#"{"at":"2019-02-27T10:00:00+00:00"}"#);
//! # Ok::<(), simple_http::HttpError>(())
//! ```

use crate::config::{default_accepted_formats, default_output_format};
use crate::error::{HttpError, Result};
use chrono::format::{Item, ParseErrorKind, StrftimeItems};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use std::cell::RefCell;

/// Ordered decode formats plus the single encode format (chrono strftime syntax)
///
/// Accepted formats without an offset specifier (`%z`, `%:z`) read values as UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormats {
    accepted: Vec<String>,
    output: String,
}

impl TimestampFormats {
    /// Create a validated format list
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidConfig`] if `accepted` is empty or any
    /// pattern contains an unknown specifier.
    pub fn new(accepted: Vec<String>, output: String) -> Result<Self> {
        if accepted.is_empty() {
            return Err(HttpError::InvalidConfig(
                "at least one accepted timestamp format is required".to_string(),
            ));
        }
        for pattern in accepted.iter().chain(std::iter::once(&output)) {
            validate_pattern(pattern)?;
        }
        Ok(Self { accepted, output })
    }

    /// Formats tried on decode, in order
    #[must_use]
    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }

    /// Format written on encode
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Default for TimestampFormats {
    fn default() -> Self {
        Self {
            accepted: default_accepted_formats(),
            output: default_output_format(),
        }
    }
}

fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Err(HttpError::InvalidConfig(
            "timestamp format cannot be empty".to_string(),
        ));
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(HttpError::InvalidConfig(format!(
            "invalid timestamp format: {pattern}"
        )));
    }
    Ok(())
}

/// Parse `value` with the first accepted format that matches
///
/// A trailing `Z` designator is read as `+00:00`. A format without an offset
/// specifier reads the value as UTC.
///
/// # Errors
///
/// Returns [`HttpError::InvalidTimestamp`] if no format matches.
pub fn parse(value: &str, formats: &TimestampFormats) -> Result<DateTime<Utc>> {
    let normalized = value
        .strip_suffix('Z')
        .map_or_else(|| value.to_string(), |head| format!("{head}+00:00"));

    formats
        .accepted
        .iter()
        .find_map(|pattern| parse_one(value, &normalized, pattern))
        .ok_or_else(|| HttpError::InvalidTimestamp {
            value: value.to_string(),
            formats: formats.accepted.clone(),
        })
}

fn parse_one(value: &str, normalized: &str, pattern: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_str(normalized, pattern) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        // the pattern carries no offset
        Err(err) if err.kind() == ParseErrorKind::NotEnough => {
            NaiveDateTime::parse_from_str(value, pattern)
                .ok()
                .map(|naive| naive.and_utc())
        }
        Err(_) => None,
    }
}

/// Render `value` in UTC with the output format
#[must_use]
pub fn format(value: &DateTime<Utc>, formats: &TimestampFormats) -> String {
    value.format(&formats.output).to_string()
}

thread_local! {
    static ACTIVE_FORMATS: RefCell<TimestampFormats> = RefCell::new(TimestampFormats::default());
    static REJECTED: RefCell<Option<Rejection>> = const { RefCell::new(None) };
}

/// A timestamp the active formats refused, and the serde message raised for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rejection {
    pub(crate) value: String,
    pub(crate) message: String,
}

/// Restores the previously active formats when dropped
pub(crate) struct FormatsScope {
    previous: Option<TimestampFormats>,
    previous_rejected: Option<Rejection>,
}

impl FormatsScope {
    /// The last timestamp rejected inside this scope
    pub(crate) fn take_rejected(&self) -> Option<Rejection> {
        REJECTED.with(|rejected| rejected.borrow_mut().take())
    }
}

impl Drop for FormatsScope {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let _ = ACTIVE_FORMATS.with(|active| active.replace(previous));
        }
        let previous_rejected = self.previous_rejected.take();
        let _ = REJECTED.with(|rejected| rejected.replace(previous_rejected));
    }
}

/// Make `formats` the active set on this thread until the scope is dropped
pub(crate) fn enter(formats: TimestampFormats) -> FormatsScope {
    let previous = ACTIVE_FORMATS.with(|active| active.replace(formats));
    let previous_rejected = REJECTED.with(|rejected| rejected.replace(None));
    FormatsScope {
        previous: Some(previous),
        previous_rejected,
    }
}

fn with_active<R>(f: impl FnOnce(&TimestampFormats) -> R) -> R {
    ACTIVE_FORMATS.with(|active| f(&active.borrow()))
}

fn parse_active<E: serde::de::Error>(raw: &str) -> std::result::Result<DateTime<Utc>, E> {
    with_active(|formats| parse(raw, formats)).map_err(|err| match err {
        HttpError::InvalidTimestamp { value, formats } => {
            let message = format!("invalid timestamp '{value}', expected one of {formats:?}");
            let error = E::custom(&message);
            let _ = REJECTED.with(|rejected| rejected.replace(Some(Rejection { value, message })));
            error
        }
        other => E::custom(other),
    })
}

/// Serialize a timestamp with the active output format
///
/// # Errors
///
/// Propagates the serializer's error.
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let rendered = with_active(|formats| format(value, formats));
    serializer.serialize_str(&rendered)
}

/// Deserialize a timestamp with the active accepted formats
///
/// # Errors
///
/// Fails if the value is not a string or matches no accepted format.
pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_active(&raw)
}

/// Adapters for `Option<DateTime<Utc>>`; `null` maps to `None`
pub mod option {
    use super::{parse_active, with_active};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize an optional timestamp, writing `null` for `None`
    ///
    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => {
                let rendered = with_active(|formats| super::format(value, formats));
                serializer.serialize_some(&rendered)
            }
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional timestamp
    ///
    /// # Errors
    ///
    /// Fails if a present value matches no accepted format.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_active(&raw))
            .transpose()
    }
}
