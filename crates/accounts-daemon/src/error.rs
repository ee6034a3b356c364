//! Errors raised by the daemon binary outside the query engine itself.

use thiserror::Error;

/// Failures in configuration loading, socket setup, or process lifecycle
/// management. Distinct from [`accounts_core::Error`], which only ever
/// reports `NOT_FOUND` to query callers.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration file missing, unreadable, or malformed.
    #[error("configuration error: {0}")]
    Config(String),
    /// Binding or otherwise preparing the Unix socket failed.
    #[error("socket error: {0}")]
    Socket(String),
    /// Building the upstream HTTP client failed.
    #[error("upstream source error: {0}")]
    Source(String),
    /// Writing or removing the PID file failed.
    #[error("pid file error: {0}")]
    PidFile(#[source] std::io::Error),
}
