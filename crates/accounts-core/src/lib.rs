#![deny(unsafe_code)]
//! # Overview
//!
//! `accounts-core` is the caching and refresh engine behind a host identity
//! resolution daemon. It mediates between a remote user-accounts source and
//! a local query surface answering `getpwnam`-style lookups: users by name
//! or uid, groups by name or gid, enumeration, name existence, and
//! authorized SSH keys.
//!
//! # Design
//!
//! An [`index::Index`] holds four consistent mappings (name/uid → user,
//! name/gid → group) behind a single reader/writer lock. A long-lived
//! [`coordinator`] task owns all writes: it merges a periodic roster refresh
//! with on-demand requests posted by the query surface, observing a cooldown
//! so that bursts of cache misses do not amplify into bursts of upstream
//! calls. After every roster refresh it schedules a [`fanout`] pass that
//! fetches authorized keys for any user whose cached keys have aged past the
//! configured frequency, fanning the fetches out across concurrent tasks and
//! merging the results back into the index atomically.
//!
//! The externally-visible entry point is [`directory::Directory`], which
//! implements the read operations of the query surface and the refresh
//! semantics each one triggers.
//!
//! # Invariants
//!
//! See [`index`] for the index's consistency invariants and [`sudoers`] for
//! the synthetic `gce-sudoers` group's derivation rule.
//!
//! # Errors
//!
//! The only error the engine surfaces to callers is
//! [`error::Error::NotFound`]; upstream transport failures are logged and
//! either retried on cadence or masked by serving stale data (see
//! [`error::SourceError`]).
//!
//! # Examples
//!
//! ```ignore
//! let directory = Directory::new(config, clock, source).await;
//! let user = directory.user_by_name("alice").await?;
//! ```
//!
//! # See also
//!
//! `accounts-protocol` for the wire format this engine is queried through,
//! and `accounts-source` for a concrete `AccountSource`.

/// Injectable time source used throughout the engine instead of direct OS
/// clock calls.
pub mod clock;
/// Runtime configuration: refresh frequencies and cooldowns.
pub mod config;
/// Single-task refresh loop merging periodic and on-demand refreshes.
pub mod coordinator;
/// Query surface exposed to the socket server.
pub mod directory;
/// Error taxonomy surfaced by the engine.
pub mod error;
/// Parallel per-user authorized-keys fetch and merge.
pub mod fanout;
/// The four-mapping cache with swap-in updates.
pub mod index;
/// User and group record types.
pub mod model;
/// Capability interface to the remote roster/keys source.
pub mod source;
/// Derivation of the synthetic `gce-sudoers` group.
pub mod sudoers;

#[cfg(any(test, feature = "test-util"))]
/// Deterministic clock and scriptable `AccountSource` for tests.
pub mod testing;

pub use directory::Directory;
pub use error::{Error, NotFoundKind};
pub use model::{Group, User};
