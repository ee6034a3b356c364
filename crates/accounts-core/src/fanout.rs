//! Parallel per-user authorized-keys fetch and merge.
//!
//! [`spawn_pass`] is called by the coordinator after every wake. It finds
//! the names whose cached keys have aged past `key_refresh_frequency`,
//! spawns one concurrent task per candidate to call
//! [`crate::source::AccountSource::fetch_keys`], and once every task has
//! reported, merges the results back into the index through a single pass
//! so that, with respect to readers, all successful updates from one
//! fan-out pass become visible together.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::clock::Clock;
use crate::index::Index;
use crate::source::AccountSource;

/// Schedules one fan-out pass as a detached task. Returns immediately; the
/// coordinator does not wait for key fetches to complete before handling
/// its next wake.
pub fn spawn_pass(
    index: Arc<Index>,
    source: Arc<dyn AccountSource>,
    clock: Arc<dyn Clock>,
    key_refresh_frequency: Duration,
) {
    tokio::spawn(async move {
        run_pass(index, source, clock, key_refresh_frequency).await;
    });
}

async fn run_pass(
    index: Arc<Index>,
    source: Arc<dyn AccountSource>,
    clock: Arc<dyn Clock>,
    key_refresh_frequency: Duration,
) {
    let now = clock.now();
    let candidates = index.names_needing_key_refresh(now, key_refresh_frequency).await;
    if candidates.is_empty() {
        return;
    }

    let mut tasks = JoinSet::new();
    for name in candidates {
        let source = source.clone();
        tasks.spawn(async move {
            let result = source.fetch_keys(&name).await;
            (name, result)
        });
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => results.push(outcome),
            Err(join_error) => {
                tracing::error!(%join_error, "key refresh task panicked");
            }
        }
    }

    let refreshed_at = clock.now();
    for (name, result) in results {
        match result {
            Ok((keys, sudoer)) => {
                index.apply_key_refresh(&name, keys, sudoer, refreshed_at).await;
            }
            Err(error) => {
                tracing::error!(user = %name, %error, "key refresh failed for user");
            }
        }
    }
}
