//! Runtime configuration: refresh frequencies and cooldowns.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The four timing knobs that govern refresh behavior.
///
/// Deserialized by `accounts-daemon` from plain seconds in a TOML file; the
/// engine itself only ever sees the converted [`Duration`] values via
/// [`RefreshConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    /// Periodic cadence for roster refresh, in seconds.
    pub account_refresh_frequency_secs: u64,
    /// Lower bound between roster refreshes, in seconds.
    pub account_refresh_cooldown_secs: u64,
    /// Age at which cached keys become eligible for background refresh, in
    /// seconds.
    pub key_refresh_frequency_secs: u64,
    /// Age below which cached keys are served without contacting upstream,
    /// in seconds.
    pub key_refresh_cooldown_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            account_refresh_frequency_secs: 300,
            account_refresh_cooldown_secs: 30,
            key_refresh_frequency_secs: 3600,
            key_refresh_cooldown_secs: 60,
        }
    }
}

impl RefreshSettings {
    /// Converts the seconds-based settings into the [`RefreshConfig`] the
    /// engine operates on.
    #[must_use]
    pub fn to_config(&self) -> RefreshConfig {
        RefreshConfig {
            account_refresh_frequency: Duration::from_secs(self.account_refresh_frequency_secs),
            account_refresh_cooldown: Duration::from_secs(self.account_refresh_cooldown_secs),
            key_refresh_frequency: Duration::from_secs(self.key_refresh_frequency_secs),
            key_refresh_cooldown: Duration::from_secs(self.key_refresh_cooldown_secs),
        }
    }
}

/// Typed, in-process form of [`RefreshSettings`] used by the coordinator,
/// fan-out, and directory.
#[derive(Debug, Clone, Copy)]
pub struct RefreshConfig {
    /// See [`RefreshSettings::account_refresh_frequency_secs`].
    pub account_refresh_frequency: Duration,
    /// See [`RefreshSettings::account_refresh_cooldown_secs`].
    pub account_refresh_cooldown: Duration,
    /// See [`RefreshSettings::key_refresh_frequency_secs`].
    pub key_refresh_frequency: Duration,
    /// See [`RefreshSettings::key_refresh_cooldown_secs`].
    pub key_refresh_cooldown: Duration,
}
