//! Deterministic clock and scriptable `AccountSource` for tests.
//!
//! Exported unconditionally under `#[cfg(test)]` for this crate's own unit
//! tests, and additionally under the `test-util` feature so downstream
//! crates (`accounts-daemon`'s integration tests) can drive the engine
//! without real time or network I/O.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::SourceError;
use crate::model::{Group, User};
use crate::source::AccountSource;

#[derive(Default)]
struct State {
    roster: (Vec<User>, Vec<Group>),
    fail_roster_once: bool,
    roster_fetch_count: u64,
    keys: HashMap<String, (Vec<String>, bool)>,
    failing_keys: std::collections::HashSet<String>,
    keys_fetch_count: HashMap<String, u64>,
}

/// A scriptable [`AccountSource`] for deterministic tests.
///
/// Configure the roster and per-user keys it will return with
/// [`FakeAccountSource::set_roster`] and [`FakeAccountSource::set_keys`];
/// arrange a single simulated transport failure with
/// [`FakeAccountSource::fail_next_roster`] or a persistent one with
/// [`FakeAccountSource::fail_keys_for`].
pub struct FakeAccountSource {
    state: Mutex<State>,
}

impl FakeAccountSource {
    /// A source with an empty roster and no keys configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Sets the roster the next and all subsequent `fetch_roster` calls
    /// return, until changed again.
    pub fn set_roster(&self, users: Vec<User>, groups: Vec<Group>) {
        self.state.lock().unwrap().roster = (users, groups);
    }

    /// Arranges for the next `fetch_roster` call to fail; the one after
    /// that succeeds with whatever roster is configured.
    pub fn fail_next_roster(&self) {
        self.state.lock().unwrap().fail_roster_once = true;
    }

    /// Sets the keys and sudoer flag `fetch_keys(name)` returns, and clears
    /// any simulated failure previously armed for `name` via
    /// [`FakeAccountSource::fail_keys_for`].
    pub fn set_keys(&self, name: &str, keys: Vec<String>, sudoer: bool) {
        let mut state = self.state.lock().unwrap();
        state.keys.insert(name.to_string(), (keys, sudoer));
        state.failing_keys.remove(name);
    }

    /// Arranges for every subsequent `fetch_keys(name)` call to fail, until
    /// [`FakeAccountSource::set_keys`] is called for the same name.
    pub fn fail_keys_for(&self, name: &str) {
        self.state.lock().unwrap().failing_keys.insert(name.to_string());
    }

    /// Number of `fetch_roster` calls made so far, including failed ones.
    #[must_use]
    pub fn roster_fetch_count(&self) -> u64 {
        self.state.lock().unwrap().roster_fetch_count
    }

    /// Number of `fetch_keys` calls made so far for `name`.
    #[must_use]
    pub fn keys_fetch_count(&self, name: &str) -> u64 {
        self.state.lock().unwrap().keys_fetch_count.get(name).copied().unwrap_or(0)
    }
}

impl Default for FakeAccountSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AccountSource for FakeAccountSource {
    async fn fetch_roster(&self) -> Result<(Vec<User>, Vec<Group>), SourceError> {
        let mut state = self.state.lock().unwrap();
        state.roster_fetch_count += 1;
        if std::mem::take(&mut state.fail_roster_once) {
            return Err(SourceError::Upstream("simulated roster fetch failure".to_string()));
        }
        Ok(state.roster.clone())
    }

    async fn fetch_keys(&self, name: &str) -> Result<(Vec<String>, bool), SourceError> {
        let mut state = self.state.lock().unwrap();
        *state.keys_fetch_count.entry(name.to_string()).or_insert(0) += 1;
        if state.failing_keys.contains(name) {
            return Err(SourceError::Upstream(format!("simulated key fetch failure for {name}")));
        }
        Ok(state.keys.get(name).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, uid: u32) -> User {
        User {
            name: name.to_string(),
            uid,
            gid: 1000,
            gecos: String::new(),
            home: format!("/home/{name}"),
            shell: "/bin/bash".to_string(),
        }
    }

    #[tokio::test]
    async fn fetch_roster_returns_configured_roster() {
        let source = FakeAccountSource::new();
        source.set_roster(vec![user("alice", 1001)], vec![]);

        let (users, groups) = source.fetch_roster().await.expect("roster");
        assert_eq!(users.len(), 1);
        assert!(groups.is_empty());
        assert_eq!(source.roster_fetch_count(), 1);
    }

    #[tokio::test]
    async fn fail_next_roster_fails_once_then_recovers() {
        let source = FakeAccountSource::new();
        source.set_roster(vec![user("alice", 1001)], vec![]);
        source.fail_next_roster();

        assert!(source.fetch_roster().await.is_err());
        assert!(source.fetch_roster().await.is_ok());
    }

    #[tokio::test]
    async fn fetch_keys_defaults_to_empty_and_non_sudoer() {
        let source = FakeAccountSource::new();
        let (keys, sudoer) = source.fetch_keys("nobody").await.expect("ok");
        assert!(keys.is_empty());
        assert!(!sudoer);
    }

    #[tokio::test]
    async fn fail_keys_for_persists_until_set_keys() {
        let source = FakeAccountSource::new();
        source.fail_keys_for("alice");
        assert!(source.fetch_keys("alice").await.is_err());
        assert!(source.fetch_keys("alice").await.is_err());

        source.set_keys("alice", vec!["k".to_string()], false);
        assert!(source.fetch_keys("alice").await.is_ok());
    }
}
