//! TOML-deserialized daemon configuration.
//!
//! Plain scalars on disk, converted into the typed values the rest of the
//! daemon operates on (durations, an [`accounts_source::SourceConfig`], an
//! [`accounts_core::config::RefreshConfig`]) in one place.

use std::path::PathBuf;
use std::time::Duration;

use accounts_core::config::{RefreshConfig, RefreshSettings};
use accounts_source::SourceConfig;
use serde::Deserialize;

use crate::error::DaemonError;

/// On-disk configuration, as deserialized from TOML.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Unix socket path the query server listens on.
    pub socket_path: PathBuf,
    /// Optional PID file path; if set, written on startup and removed on
    /// clean shutdown.
    pub pid_file: Option<PathBuf>,
    /// Refresh cadences and cooldowns; see
    /// [`accounts_core::config::RefreshSettings`].
    #[serde(flatten)]
    pub refresh: RefreshSettings,
    /// Upstream REST API connection settings.
    pub source: SourceSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("/var/run/accounts-daemon.sock"),
            pid_file: None,
            refresh: RefreshSettings::default(),
            source: SourceSettings::default(),
        }
    }
}

/// Upstream REST API connection settings, as deserialized from TOML.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Base URL of the remote user-accounts REST API.
    pub base_url: String,
    /// The cloud VM instance this daemon resolves identities for.
    pub instance_id: String,
    /// Bearer token for upstream requests, if required.
    pub bearer_token: Option<String>,
    /// Per-request timeout against upstream, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            instance_id: String::new(),
            bearer_token: None,
            request_timeout_secs: 10,
        }
    }
}

impl SourceSettings {
    /// Converts into the typed [`SourceConfig`] `accounts-source` operates
    /// on.
    #[must_use]
    pub fn to_source_config(&self) -> SourceConfig {
        SourceConfig {
            base_url: self.base_url.clone(),
            instance_id: self.instance_id.clone(),
            bearer_token: self.bearer_token.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

impl Config {
    /// Loads and parses configuration from a TOML file.
    pub async fn load(path: &std::path::Path) -> Result<Self, DaemonError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|error| DaemonError::Config(format!("reading {}: {error}", path.display())))?;
        toml::from_str(&text).map_err(|error| DaemonError::Config(format!("parsing {}: {error}", path.display())))
    }

    /// The typed [`RefreshConfig`] the engine operates on.
    #[must_use]
    pub fn refresh_config(&self) -> RefreshConfig {
        self.refresh.to_config()
    }
}
