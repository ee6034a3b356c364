//! Monotonic time abstraction, injectable so tests never depend on wall time.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A point in time, measured in milliseconds since an arbitrary epoch chosen
/// by the [`Clock`] implementation. Only ever compared against values from
/// the same clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The "never happened" timestamp. Always [`outside`] any finite
    /// duration, so a field initialized to `ZERO` forces an initial fetch.
    pub const ZERO: Timestamp = Timestamp(0);

    fn millis(self) -> u64 {
        self.0
    }

    /// Returns the timestamp this many milliseconds after `self`, saturating
    /// rather than overflowing.
    #[must_use]
    pub fn checked_add(self, duration: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(duration.as_millis() as u64))
    }
}

/// `start == ZERO || now < start || now > start + duration`.
///
/// `Timestamp::ZERO` means "never happened" rather than a real point in
/// time coinciding with the clock's epoch, so it is always outside any
/// window regardless of `now` — without this check, a `now == 0` sample
/// (true at process start, and of every `MockClock` before its first
/// `advance`) would make a never-refreshed field look fresh instead of
/// forcing the initial fetch.
///
/// Used for both cooldown checks (has enough time passed since the last
/// attempt?) and key-age checks (has this cached value aged past its
/// refresh frequency?).
#[must_use]
pub fn outside(now: Timestamp, start: Timestamp, duration: Duration) -> bool {
    start == Timestamp::ZERO || now < start || now > start.checked_add(duration)
}

/// A future that resolves exactly once, after the requested delay has
/// elapsed according to the owning clock.
pub type Delay = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Injectable source of "now" and of delay futures.
///
/// Implementations must be cheap to clone (typically an `Arc` internally)
/// since the coordinator, the fan-out workers, and every query surface call
/// all hold a reference.
pub trait Clock: Send + Sync + 'static {
    /// The current time according to this clock.
    fn now(&self) -> Timestamp;

    /// A future that resolves after `duration` has elapsed.
    fn after(&self, duration: Duration) -> Delay;
}

/// Real wall-clock time, backed by `std::time::Instant` for monotonicity and
/// `tokio::time::sleep` for delays.
pub struct SystemClock {
    start: std::time::Instant,
}

impl SystemClock {
    /// Creates a clock whose epoch is "now".
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.start.elapsed().as_millis() as u64)
    }

    fn after(&self, duration: Duration) -> Delay {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// A clock whose notion of "now" only moves when [`MockClock::advance`] is
/// called, for deterministic tests of refresh cadence and cooldown.
#[derive(Clone)]
pub struct MockClock {
    now: std::sync::Arc<AtomicU64>,
    waiters: std::sync::Arc<tokio::sync::Notify>,
}

impl MockClock {
    /// Creates a mock clock starting at [`Timestamp::ZERO`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: std::sync::Arc::new(AtomicU64::new(0)),
            waiters: std::sync::Arc::new(tokio::sync::Notify::new()),
        }
    }

    /// Advances the clock and wakes any `after` futures whose deadline has
    /// now passed.
    pub fn advance(&self, duration: Duration) {
        self.now
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
        self.waiters.notify_waiters();
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.load(Ordering::SeqCst))
    }

    fn after(&self, duration: Duration) -> Delay {
        let now = self.now.clone();
        let waiters = self.waiters.clone();
        let deadline = Timestamp(now.load(Ordering::SeqCst)).checked_add(duration);
        Box::pin(async move {
            loop {
                if Timestamp(now.load(Ordering::SeqCst)) >= deadline {
                    return;
                }
                waiters.notified().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_outside_any_window() {
        assert!(outside(Timestamp::ZERO, Timestamp::ZERO, Duration::from_secs(30)));
    }

    #[test]
    fn outside_is_false_within_window() {
        let start = Timestamp(1_000);
        let now = Timestamp(1_500);
        assert!(!outside(now, start, Duration::from_secs(1)));
    }

    #[test]
    fn outside_is_true_before_start() {
        let start = Timestamp(1_000);
        let now = Timestamp(500);
        assert!(outside(now, start, Duration::from_secs(10)));
    }

    #[test]
    fn outside_is_true_after_window() {
        let start = Timestamp(1_000);
        let now = Timestamp(3_000);
        assert!(outside(now, start, Duration::from_millis(500)));
    }

    #[tokio::test]
    async fn mock_clock_after_resolves_once_advanced() {
        let clock = MockClock::new();
        let delay = clock.after(Duration::from_millis(100));
        let advancer = clock.clone();
        let handle = tokio::spawn(async move {
            delay.await;
        });
        tokio::task::yield_now().await;
        advancer.advance(Duration::from_millis(150));
        handle.await.expect("delay task completes");
    }

    #[tokio::test]
    async fn mock_clock_after_resolves_immediately_if_already_past() {
        let clock = MockClock::new();
        clock.advance(Duration::from_secs(5));
        clock.after(Duration::from_millis(0)).await;
    }
}
