//! Capability interface to the remote roster/keys source.
//!
//! The engine depends only on this trait; `accounts-source` provides the
//! concrete REST-backed implementation used in production, and
//! [`crate::testing::FakeAccountSource`] a scriptable one for tests.

use crate::error::SourceError;
use crate::model::{Group, User};

/// The two operations the refresh engine needs from upstream.
#[async_trait::async_trait]
pub trait AccountSource: Send + Sync + 'static {
    /// Fetches the complete authoritative roster for this VM.
    async fn fetch_roster(&self) -> Result<(Vec<User>, Vec<Group>), SourceError>;

    /// Fetches the authorized keys and sudoer flag for one user.
    ///
    /// A user unknown to upstream is reported as `(empty, false)`, not as
    /// an error, so that a roster member without any keys yet is still
    /// cacheable.
    async fn fetch_keys(&self, name: &str) -> Result<(Vec<String>, bool), SourceError>;
}
