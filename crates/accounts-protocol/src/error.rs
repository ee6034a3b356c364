//! Errors produced while parsing or decoding the wire protocol.

use thiserror::Error;

/// Failures at the protocol boundary. Never produced by `accounts-core`
/// itself — these originate in the socket server (malformed inbound
/// requests) or the client (malformed responses from a misbehaving peer).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A request line didn't parse as a known command, or a response body
    /// didn't match the shape the request implied.
    #[error("malformed request or response: {0}")]
    Malformed(String),
    /// The peer reported `404`.
    #[error("not found")]
    NotFound,
    /// The peer reported `500`.
    #[error("peer reported an error: {0}")]
    Peer(String),
}
