//! JSON payload codec
//!
//! Converts between raw bytes and caller-defined types. The only special-cased
//! field type is the timestamp (see [`timestamp`]): decode accepts an ordered
//! list of formats, encode always writes the single output format.

pub mod timestamp;

use crate::config::CodecConfig;
use crate::error::{HttpError, Result};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use timestamp::{FormatsScope, TimestampFormats};

/// Bytes ⇄ domain object conversion with configurable timestamp formats
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Codec {
    formats: TimestampFormats,
}

impl Codec {
    /// Create a codec using `formats` for timestamp fields
    #[must_use]
    pub const fn new(formats: TimestampFormats) -> Self {
        Self { formats }
    }

    /// Create a codec from configuration
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidConfig`] if the configured formats are invalid.
    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        Ok(Self::new(config.timestamp_formats()?))
    }

    /// Timestamp formats used by this codec
    #[must_use]
    pub const fn formats(&self) -> &TimestampFormats {
        &self.formats
    }

    /// Decode JSON bytes into `T`
    ///
    /// # Errors
    ///
    /// - [`HttpError::MalformedJson`] for invalid or truncated JSON
    /// - [`HttpError::InvalidTimestamp`] for a timestamp no format accepts
    /// - [`HttpError::ShapeMismatch`] for anything else that does not fit `T`
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let scope = timestamp::enter(self.formats.clone());
        serde_json::from_slice(bytes).map_err(|err| {
            let err = self.classify_decode_error(&scope, err);
            warn!("JSON decode failed: {err}");
            err
        })
    }

    /// Encode `value` as compact JSON
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Encode`] if `T`'s `Serialize` implementation fails.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let _scope = timestamp::enter(self.formats.clone());
        serde_json::to_vec(value).map_err(|err| {
            warn!("JSON encode failed: {err}");
            HttpError::Encode(err)
        })
    }

    fn classify_decode_error(&self, scope: &FormatsScope, err: serde_json::Error) -> HttpError {
        // a rejection swallowed by an untagged enum or similar must not win
        match scope.take_rejected() {
            Some(rejected) if err.is_data() && err.to_string().starts_with(&rejected.message) => {
                HttpError::InvalidTimestamp {
                    value: rejected.value,
                    formats: self.formats.accepted().to_vec(),
                }
            }
            _ => HttpError::from(err),
        }
    }
}

/// Decode with the default timestamp formats
///
/// # Errors
///
/// See [`Codec::decode`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Codec::default().decode(bytes)
}

/// Encode with the default timestamp format
///
/// # Errors
///
/// See [`Codec::encode`].
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Codec::default().encode(value)
}
