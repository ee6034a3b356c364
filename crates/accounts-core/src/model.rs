//! User and group record types.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// An immutable snapshot of one principal as returned by the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique, non-empty login name.
    pub name: String,
    /// Unique numeric user id.
    pub uid: u32,
    /// Primary numeric group id.
    pub gid: u32,
    /// Free-form GECOS comment field.
    pub gecos: String,
    /// Home directory path.
    pub home: String,
    /// Login shell path.
    pub shell: String,
}

/// A group as returned by the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group name.
    pub name: String,
    /// Unique numeric group id.
    pub gid: u32,
    /// Member names. May reference users not currently known to the index;
    /// they remain opaque strings in that case.
    pub members: Vec<String>,
}

/// A [`User`] plus the key-related state that only the refresh engine
/// mutates: the most recently fetched authorized keys, whether the user is
/// a sudoer, and when the keys were last refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedUser {
    /// The roster-supplied record.
    pub user: User,
    /// Most recent authorized keys. Empty until the first key fetch for
    /// this user completes.
    pub keys: Vec<String>,
    /// Whether this user should appear in the synthetic `gce-sudoers`
    /// group.
    pub sudoer: bool,
    /// When `keys`/`sudoer` were last refreshed. [`Timestamp::ZERO`] means
    /// never.
    pub key_refresh_time: Timestamp,
}

impl CachedUser {
    /// Wraps a freshly-seen `User` with empty, never-refreshed key state.
    #[must_use]
    pub fn fresh(user: User) -> Self {
        Self {
            user,
            keys: Vec::new(),
            sudoer: false,
            key_refresh_time: Timestamp::ZERO,
        }
    }

    /// Wraps `user` while carrying over key state from a previous cached
    /// record for the same name, per the index's swap-in carryover rule.
    #[must_use]
    pub fn carrying_over(user: User, previous: &CachedUser) -> Self {
        Self {
            user,
            keys: previous.keys.clone(),
            sudoer: previous.sudoer,
            key_refresh_time: previous.key_refresh_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(name: &str) -> User {
        User {
            name: name.to_string(),
            uid: 1000,
            gid: 1000,
            gecos: String::new(),
            home: format!("/home/{name}"),
            shell: "/bin/bash".to_string(),
        }
    }

    #[test]
    fn fresh_cached_user_has_empty_key_state() {
        let cached = CachedUser::fresh(sample_user("alice"));
        assert!(cached.keys.is_empty());
        assert!(!cached.sudoer);
        assert_eq!(cached.key_refresh_time, Timestamp::ZERO);
    }

    #[test]
    fn carrying_over_preserves_key_state_across_a_new_record() {
        let mut previous = CachedUser::fresh(sample_user("alice"));
        previous.keys = vec!["ssh-ed25519 AAAA".to_string()];
        previous.sudoer = true;
        previous.key_refresh_time = Timestamp::ZERO.checked_add(std::time::Duration::from_secs(5));

        let mut updated_user = sample_user("alice");
        updated_user.shell = "/bin/zsh".to_string();

        let carried = CachedUser::carrying_over(updated_user.clone(), &previous);
        assert_eq!(carried.user, updated_user);
        assert_eq!(carried.keys, previous.keys);
        assert_eq!(carried.sudoer, previous.sudoer);
        assert_eq!(carried.key_refresh_time, previous.key_refresh_time);
    }
}
