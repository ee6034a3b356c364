//! Single-task refresh loop merging periodic and on-demand refreshes.
//!
//! # Design
//!
//! One task, spawned by [`spawn`], owns all writes to the [`crate::index::Index`].
//! It wakes on whichever comes first: a request posted through the
//! [`RefreshHandle`], or the periodic `account_refresh_frequency` timer. On
//! each wake it performs at most one roster refresh (skipped if the
//! cooldown hasn't elapsed), schedules a key fan-out pass, and — if the wake
//! was a request with a completion channel — signals that channel once the
//! refresh attempt (successful or not) has finished.
//!
//! This coalesces a burst of on-demand requests arriving before the
//! coordinator wakes into the single refresh that wake performs; requests
//! arriving during that refresh are handled by the next iteration.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::clock::{outside, Clock, Timestamp};
use crate::config::RefreshConfig;
use crate::fanout;
use crate::index::Index;
use crate::source::AccountSource;

/// A signal posted to the coordinator. Carries an optional completion
/// channel: present for a blocking on-demand refresh, absent for a
/// fire-and-forget one.
struct RefreshRequest {
    completion: Option<oneshot::Sender<()>>,
}

/// Handle used by the query surface to ask the coordinator to refresh.
#[derive(Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<RefreshRequest>,
}

impl RefreshHandle {
    /// Posts a request and waits until the coordinator has completed the
    /// refresh attempt it triggers. Used by `UserByName` on a cache miss.
    pub async fn request_and_wait(&self) {
        let (tx, rx) = oneshot::channel();
        if self
            .tx
            .send(RefreshRequest { completion: Some(tx) })
            .await
            .is_err()
        {
            return;
        }
        let _ = rx.await;
    }

    /// Posts a request without waiting for it to be handled. Used by
    /// `GroupByName`/`GroupByGid` misses so the caller isn't blocked.
    pub fn request_fire_and_forget(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(RefreshRequest { completion: None }).await;
        });
    }
}

/// Spawns the coordinator task and returns a handle to it.
///
/// The tokio mpsc channel backing the handle has capacity 1, the closest
/// available approximation of the conceptually unbuffered request channel:
/// tokio disallows zero-capacity bounded channels.
pub fn spawn(
    index: Arc<Index>,
    source: Arc<dyn AccountSource>,
    clock: Arc<dyn Clock>,
    config: RefreshConfig,
) -> RefreshHandle {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(run(index, source, clock, config, rx));
    RefreshHandle { tx }
}

enum Wake {
    Request(RefreshRequest),
    ChannelClosed,
    Tick,
}

async fn run(
    index: Arc<Index>,
    source: Arc<dyn AccountSource>,
    clock: Arc<dyn Clock>,
    config: RefreshConfig,
    mut rx: mpsc::Receiver<RefreshRequest>,
) {
    let mut last_roster_refresh = Timestamp::ZERO;

    loop {
        let wake = tokio::select! {
            biased;
            req = rx.recv() => match req {
                Some(req) => Wake::Request(req),
                None => Wake::ChannelClosed,
            },
            () = clock.after(config.account_refresh_frequency) => Wake::Tick,
        };

        let requester = match wake {
            Wake::ChannelClosed => return,
            Wake::Request(req) => Some(req),
            Wake::Tick => None,
        };

        if outside(clock.now(), last_roster_refresh, config.account_refresh_cooldown) {
            match source.fetch_roster().await {
                Ok((users, groups)) => {
                    index.swap_in(users, groups).await;
                }
                Err(error) => {
                    tracing::warn!(%error, "roster refresh failed; serving stale data");
                }
            }
            // Updated even on failure: this is the backoff. A failing
            // upstream is retried at account_refresh_frequency, not hammered
            // every time a caller misses.
            last_roster_refresh = clock.now();
        }

        fanout::spawn_pass(
            index.clone(),
            source.clone(),
            clock.clone(),
            config.key_refresh_frequency,
        );

        if let Some(req) = requester {
            if let Some(completion) = req.completion {
                let _ = completion.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::testing::FakeAccountSource;
    use std::time::Duration;

    fn config() -> RefreshConfig {
        RefreshConfig {
            account_refresh_frequency: Duration::from_secs(60),
            account_refresh_cooldown: Duration::from_secs(10),
            key_refresh_frequency: Duration::from_secs(60),
            key_refresh_cooldown: Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn request_and_wait_returns_after_a_roster_refresh() {
        let index = Arc::new(Index::new());
        let source = Arc::new(FakeAccountSource::new());
        source.set_roster(vec![], vec![]);
        let clock = Arc::new(MockClock::new());

        let handle = spawn(index.clone(), source.clone(), clock.clone(), config());
        handle.request_and_wait().await;

        assert_eq!(source.roster_fetch_count(), 1);
    }

    #[tokio::test]
    async fn cooldown_prevents_a_second_refresh_from_a_second_request() {
        let index = Arc::new(Index::new());
        let source = Arc::new(FakeAccountSource::new());
        source.set_roster(vec![], vec![]);
        let clock = Arc::new(MockClock::new());

        let handle = spawn(index.clone(), source.clone(), clock.clone(), config());
        handle.request_and_wait().await;
        handle.request_and_wait().await;

        assert_eq!(source.roster_fetch_count(), 1);
    }

    #[tokio::test]
    async fn refresh_after_cooldown_elapses_fetches_again() {
        let index = Arc::new(Index::new());
        let source = Arc::new(FakeAccountSource::new());
        source.set_roster(vec![], vec![]);
        let clock = Arc::new(MockClock::new());

        let handle = spawn(index.clone(), source.clone(), clock.clone(), config());
        handle.request_and_wait().await;

        clock.advance(Duration::from_secs(11));
        handle.request_and_wait().await;

        assert_eq!(source.roster_fetch_count(), 2);
    }

    #[tokio::test]
    async fn failed_roster_fetch_still_updates_last_refresh_time() {
        let index = Arc::new(Index::new());
        let source = Arc::new(FakeAccountSource::new());
        source.fail_next_roster();
        let clock = Arc::new(MockClock::new());

        let handle = spawn(index.clone(), source.clone(), clock.clone(), config());
        handle.request_and_wait().await;
        handle.request_and_wait().await;

        // Second request arrives within the cooldown of the (failed) first
        // attempt, so no second fetch is attempted.
        assert_eq!(source.roster_fetch_count(), 1);
    }
}
