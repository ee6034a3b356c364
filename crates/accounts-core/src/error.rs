//! Error taxonomy surfaced by the engine.

use thiserror::Error;

/// Which lookup kind produced a [`Error::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    /// `UserByName` found no matching record.
    UserByName,
    /// `UserByUid` found no matching record.
    UserByUid,
    /// `GroupByName` found no matching record.
    GroupByName,
    /// `GroupByGid` found no matching record.
    GroupByGid,
}

/// Result type used throughout the query surface.
pub type Result<T> = std::result::Result<T, Error>;

/// The only error family the engine surfaces to callers.
///
/// Upstream transport failures ([`SourceError`]) are deliberately not a
/// variant here: they are logged and either retried on cadence or masked by
/// serving stale data, never propagated to a query caller.
#[derive(Debug, Error)]
pub enum Error {
    /// No record matched the given identifier.
    #[error("not found: {kind:?} {identifier}")]
    NotFound {
        /// Which lookup kind failed.
        kind: NotFoundKind,
        /// The name or numeric id that was looked up, rendered for
        /// diagnostics.
        identifier: String,
    },
}

impl Error {
    /// Builds a [`Error::NotFound`] for a name-keyed lookup.
    #[must_use]
    pub fn not_found(kind: NotFoundKind, identifier: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            identifier: identifier.into(),
        }
    }
}

/// Transport-level failure from an [`crate::source::AccountSource`] call.
/// Never surfaced to query callers directly; the coordinator and fan-out
/// logic log it and fall back to stale-while-error behavior.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The upstream call failed (network error, non-success status, bad
    /// payload, etc).
    #[error("upstream failure: {0}")]
    Upstream(String),
}
