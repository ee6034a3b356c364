//! The four-mapping cache with swap-in updates.
//!
//! # Invariants
//!
//! - For every cached user, the name index and the uid index point at the
//!   same record; updating one updates the other.
//! - A user's name and uid are immutable once inserted; a refresh either
//!   replaces the whole record or removes it.
//! - After a successful roster refresh the index contains exactly the users
//!   and groups returned; users that disappeared are dropped along with
//!   their key state; users that persisted retain their prior
//!   keys/sudoer/timestamp until a subsequent key refresh updates them.
//! - Reads acquire a shared lock; [`Index::swap_in`] acquires an exclusive
//!   lock and rewrites all four mappings atomically. Readers never observe
//!   a mix of old and new generations.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::model::{CachedUser, Group, User};
use crate::sudoers;

#[derive(Default)]
struct IndexData {
    users_by_name: HashMap<String, Arc<CachedUser>>,
    users_by_uid: HashMap<u32, Arc<CachedUser>>,
    groups_by_name: HashMap<String, Group>,
    groups_by_gid: HashMap<u32, Group>,
}

/// The shared, lock-guarded cache.
pub struct Index {
    data: RwLock<IndexData>,
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

impl Index {
    /// An empty index, as it exists before the bootstrapping refresh
    /// completes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: RwLock::new(IndexData::default()),
        }
    }

    /// Looks up a user by login name.
    pub async fn user_by_name(&self, name: &str) -> Option<Arc<CachedUser>> {
        self.data.read().await.users_by_name.get(name).cloned()
    }

    /// Looks up a user by numeric uid.
    pub async fn user_by_uid(&self, uid: u32) -> Option<Arc<CachedUser>> {
        self.data.read().await.users_by_uid.get(&uid).cloned()
    }

    /// Snapshot of every cached user. Order is unspecified.
    pub async fn users(&self) -> Vec<Arc<CachedUser>> {
        self.data.read().await.users_by_name.values().cloned().collect()
    }

    /// Looks up a group by name, not including the synthetic sudoers group
    /// (callers check that name first; see [`crate::directory::Directory`]).
    pub async fn group_by_name(&self, name: &str) -> Option<Group> {
        self.data.read().await.groups_by_name.get(name).cloned()
    }

    /// Looks up a group by gid, not including the synthetic sudoers group.
    pub async fn group_by_gid(&self, gid: u32) -> Option<Group> {
        self.data.read().await.groups_by_gid.get(&gid).cloned()
    }

    /// Snapshot of every cached group, not including the synthetic sudoers
    /// group. Order is unspecified.
    pub async fn groups(&self) -> Vec<Group> {
        self.data.read().await.groups_by_name.values().cloned().collect()
    }

    /// Every user and group name currently cached, not including the
    /// synthetic sudoers group.
    pub async fn all_names(&self) -> Vec<String> {
        let data = self.data.read().await;
        data.users_by_name
            .keys()
            .cloned()
            .chain(data.groups_by_name.keys().cloned())
            .collect()
    }

    /// Computes the synthetic `gce-sudoers` group from current sudoer
    /// flags. See [`sudoers`].
    pub async fn synthetic_sudoers(&self) -> Group {
        let data = self.data.read().await;
        sudoers::compute(data.users_by_name.values().map(AsRef::as_ref))
    }

    /// Rewrites all four mappings atomically from a fresh roster, carrying
    /// forward key state for users present both before and after.
    pub async fn swap_in(&self, users: Vec<User>, groups: Vec<Group>) {
        let mut data = self.data.write().await;

        let mut new_users_by_name = HashMap::with_capacity(users.len());
        let mut new_users_by_uid = HashMap::with_capacity(users.len());

        for user in users {
            let cached = match data.users_by_name.get(&user.name) {
                Some(previous) => CachedUser::carrying_over(user, previous),
                None => CachedUser::fresh(user),
            };
            let cached = Arc::new(cached);
            new_users_by_uid.insert(cached.user.uid, cached.clone());
            new_users_by_name.insert(cached.user.name.clone(), cached);
        }

        let mut new_groups_by_name = HashMap::with_capacity(groups.len());
        let mut new_groups_by_gid = HashMap::with_capacity(groups.len());
        for group in groups {
            if group.name == sudoers::NAME {
                tracing::warn!(
                    group = %group.name,
                    "upstream roster contains a group named like the reserved sudoers group; \
                     it is kept in the index but shadowed by the synthetic view on lookup"
                );
            }
            new_groups_by_gid.insert(group.gid, group.clone());
            new_groups_by_name.insert(group.name.clone(), group);
        }

        data.users_by_name = new_users_by_name;
        data.users_by_uid = new_users_by_uid;
        data.groups_by_name = new_groups_by_name;
        data.groups_by_gid = new_groups_by_gid;
    }

    /// Names of cached users whose `key_refresh_time` has aged past
    /// `frequency` relative to `now`, i.e. candidates for the next
    /// [`crate::fanout`] pass.
    pub async fn names_needing_key_refresh(
        &self,
        now: crate::clock::Timestamp,
        frequency: std::time::Duration,
    ) -> Vec<String> {
        self.data
            .read()
            .await
            .users_by_name
            .values()
            .filter(|cached| crate::clock::outside(now, cached.key_refresh_time, frequency))
            .map(|cached| cached.user.name.clone())
            .collect()
    }

    /// Applies one fan-out result to the cached user with this name, if it
    /// is still present. Silently skipped if the user was evicted by a
    /// roster refresh that raced with the fan-out pass.
    pub async fn apply_key_refresh(
        &self,
        name: &str,
        keys: Vec<String>,
        sudoer: bool,
        refreshed_at: crate::clock::Timestamp,
    ) {
        let mut data = self.data.write().await;
        let Some(previous) = data.users_by_name.get(name) else {
            return;
        };
        let updated = Arc::new(CachedUser {
            user: previous.user.clone(),
            keys,
            sudoer,
            key_refresh_time: refreshed_at,
        });
        data.users_by_uid.insert(updated.user.uid, updated.clone());
        data.users_by_name.insert(name.to_string(), updated);
    }
}
