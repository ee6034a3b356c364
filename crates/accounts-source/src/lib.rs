#![deny(unsafe_code)]
//! HTTP-backed `AccountSource` for the remote user-accounts REST API.
//!
//! The refresh engine in `accounts-core` only depends on the
//! [`accounts_core::source::AccountSource`] trait; this crate supplies the
//! concrete implementation `accounts-daemon` wires up in production,
//! fetching the roster and per-user authorized keys over HTTPS.

/// Wire DTOs for the upstream REST API.
pub mod dto;
/// Connection settings: base URL, instance id, bearer token, timeout.
pub mod config;
/// The [`HttpAccountSource`] implementation.
pub mod source;

pub use config::SourceConfig;
pub use source::HttpAccountSource;
