#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

//! # simple-http
//!
//! A small helper library for issuing HTTP requests and converting between
//! raw byte payloads and caller-defined types via JSON.
//!
//! ## Architecture
//!
//! - **[`error`]** - Typed error result shared by every operation
//! - **[`config`]** - Client and codec configuration, TOML loading
//! - **[`client`]** - Request descriptor, response outcome and dispatcher
//! - **[`codec`]** - JSON payload codec with configurable timestamp formats

pub mod client;
pub mod codec;
pub mod config;
pub mod error;

pub use client::{Dispatcher, Request, RequestBuilder, Response};
pub use codec::Codec;
pub use config::{ClientConfig, CodecConfig};
pub use error::{ErrorKind, HttpError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "simple-http";
