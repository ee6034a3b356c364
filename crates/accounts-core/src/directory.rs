//! Query surface exposed to the socket server.
//!
//! [`Directory`] is the engine's single public entry point. Each method
//! documents the refresh behavior its own miss path triggers.

use std::sync::Arc;

use crate::clock::{outside, Clock};
use crate::config::RefreshConfig;
use crate::coordinator::{self, RefreshHandle};
use crate::error::{Error, NotFoundKind, Result};
use crate::index::Index;
use crate::model::{Group, User};
use crate::source::AccountSource;
use crate::sudoers;

/// The caching and refresh engine's public entry point.
///
/// Cloning a `Directory` is cheap: every field is an `Arc` to shared state,
/// so clones share one index, one coordinator, and one upstream source.
#[derive(Clone)]
pub struct Directory {
    index: Arc<Index>,
    source: Arc<dyn AccountSource>,
    clock: Arc<dyn Clock>,
    config: RefreshConfig,
    refresh: RefreshHandle,
}

impl Directory {
    /// Builds a directory and performs the bootstrapping refresh before
    /// returning, so the index is populated by the time callers see it.
    pub async fn new(
        config: RefreshConfig,
        clock: Arc<dyn Clock>,
        source: Arc<dyn AccountSource>,
    ) -> Self {
        let index = Arc::new(Index::new());
        let refresh = coordinator::spawn(index.clone(), source.clone(), clock.clone(), config);
        refresh.request_and_wait().await;

        Self {
            index,
            source,
            clock,
            config,
            refresh,
        }
    }

    /// Looks up a user by login name. On a cache miss, triggers a blocking
    /// on-demand refresh and retries once before reporting `NOT_FOUND`.
    pub async fn user_by_name(&self, name: &str) -> Result<Arc<crate::model::CachedUser>> {
        if let Some(cached) = self.index.user_by_name(name).await {
            return Ok(cached);
        }

        self.refresh.request_and_wait().await;

        self.index
            .user_by_name(name)
            .await
            .ok_or_else(|| Error::not_found(NotFoundKind::UserByName, name))
    }

    /// Looks up a user by numeric uid. Misses are not refreshed.
    pub async fn user_by_uid(&self, uid: u32) -> Result<Arc<crate::model::CachedUser>> {
        self.index
            .user_by_uid(uid)
            .await
            .ok_or_else(|| Error::not_found(NotFoundKind::UserByUid, uid.to_string()))
    }

    /// Snapshot of every cached user.
    pub async fn users(&self) -> Vec<Arc<crate::model::CachedUser>> {
        self.index.users().await
    }

    /// Snapshot of every cached group, including the synthetic sudoers
    /// group.
    pub async fn groups(&self) -> Vec<Group> {
        let mut groups = self.index.groups().await;
        groups.push(self.index.synthetic_sudoers().await);
        groups
    }

    /// Looks up a group by name. `gce-sudoers` always resolves to the
    /// synthetic view. On a miss for any other name, dispatches a
    /// fire-and-forget refresh and reports `NOT_FOUND` immediately.
    pub async fn group_by_name(&self, name: &str) -> Result<Group> {
        if name == sudoers::NAME {
            return Ok(self.index.synthetic_sudoers().await);
        }

        match self.index.group_by_name(name).await {
            Some(group) => Ok(group),
            None => {
                self.refresh.request_fire_and_forget();
                Err(Error::not_found(NotFoundKind::GroupByName, name))
            }
        }
    }

    /// Looks up a group by numeric gid. Gid `4001` always resolves to the
    /// synthetic sudoers view. Other misses are not refreshed.
    pub async fn group_by_gid(&self, gid: u32) -> Result<Group> {
        if gid == sudoers::GID {
            return Ok(self.index.synthetic_sudoers().await);
        }

        self.index
            .group_by_gid(gid)
            .await
            .ok_or_else(|| Error::not_found(NotFoundKind::GroupByGid, gid.to_string()))
    }

    /// Union of user names, group names, and `gce-sudoers`.
    pub async fn names(&self) -> Vec<String> {
        let mut names = self.index.all_names().await;
        names.push(sudoers::NAME.to_string());
        names
    }

    /// True iff `name` is a known user, a known group, or `gce-sudoers`.
    pub async fn is_name(&self, name: &str) -> bool {
        if name == sudoers::NAME {
            return true;
        }
        self.index.user_by_name(name).await.is_some() || self.index.group_by_name(name).await.is_some()
    }

    /// Authorized keys for `username`.
    ///
    /// 1. Resolves the user via [`Directory::user_by_name`] (inheriting its
    ///    refresh behavior); a failure here propagates as `NOT_FOUND`.
    /// 2. If the cached keys are still within `key_refresh_cooldown`,
    ///    returns them as-is.
    /// 3. Otherwise fetches fresh keys synchronously. On success, schedules
    ///    an asynchronous index update and returns the fresh keys
    ///    immediately. On failure, returns the currently cached keys
    ///    without error (stale-while-error).
    pub async fn authorized_keys(&self, username: &str) -> Result<Vec<String>> {
        let cached = self.user_by_name(username).await?;

        if !outside(self.clock.now(), cached.key_refresh_time, self.config.key_refresh_cooldown) {
            return Ok(cached.keys.clone());
        }

        match self.source.fetch_keys(username).await {
            Ok((keys, sudoer)) => {
                let index = self.index.clone();
                let clock = self.clock.clone();
                let name = username.to_string();
                let keys_for_update = keys.clone();
                tokio::spawn(async move {
                    let refreshed_at = clock.now();
                    index
                        .apply_key_refresh(&name, keys_for_update, sudoer, refreshed_at)
                        .await;
                });
                Ok(keys)
            }
            Err(error) => {
                tracing::warn!(user = %username, %error, "authorized_keys fetch failed; serving stale keys");
                Ok(cached.keys.clone())
            }
        }
    }
}
