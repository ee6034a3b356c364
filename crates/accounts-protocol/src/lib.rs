#![deny(unsafe_code)]
//! Unix-socket line-protocol request/response codec.
//!
//! This crate has no I/O of its own: `accounts-daemon` reads bytes off a
//! [`tokio::net::UnixListener`](https://docs.rs/tokio) connection and hands
//! them to [`request::Request::parse`]; a client on the other end would use
//! [`request::Request::encode`] and [`response::Response::decode`] the same
//! way. Keeping the codec I/O-free makes both sides of the protocol
//! trivially testable without sockets.

/// Errors raised while parsing requests or decoding responses.
pub mod error;
/// The nine request commands, their framing constants, and per-command
/// timeouts.
pub mod request;
/// Status codes and the structured response body each command produces.
pub mod response;
/// User/group record line encoding, shared by `response` and any client.
pub mod wire;

pub use error::ProtocolError;
pub use request::Request;
pub use response::{Body, Response, Status};
