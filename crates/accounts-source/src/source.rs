//! HTTP-backed [`accounts_core::source::AccountSource`].

use accounts_core::error::SourceError;
use accounts_core::model::{Group, User};
use accounts_core::source::AccountSource;
use reqwest::StatusCode;

use crate::config::SourceConfig;
use crate::dto::{KeysDto, RosterDto};

/// Fetches the roster and per-user authorized keys from the remote
/// user-accounts REST API over HTTPS.
///
/// An "unknown user" response (`404`) from the keys endpoint is mapped to
/// `(empty, false)` rather than [`SourceError`], per the
/// [`AccountSource::fetch_keys`] contract: a roster member without keys
/// yet must still be cacheable.
pub struct HttpAccountSource {
    client: reqwest::Client,
    config: SourceConfig,
}

impl HttpAccountSource {
    /// Builds a client for the given connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying `reqwest::Client` fails to build
    /// (e.g. an invalid TLS configuration).
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| SourceError::Upstream(format!("failed to build HTTP client: {error}")))?;
        Ok(Self { client, config })
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn roster_url(&self) -> String {
        format!("{}/v1/instances/{}/roster", self.config.base_url, self.config.instance_id)
    }

    fn keys_url(&self, name: &str) -> String {
        format!(
            "{}/v1/instances/{}/users/{}/keys",
            self.config.base_url, self.config.instance_id, name
        )
    }
}

#[async_trait::async_trait]
impl AccountSource for HttpAccountSource {
    async fn fetch_roster(&self) -> Result<(Vec<User>, Vec<Group>), SourceError> {
        let response = self
            .authorize(self.client.get(self.roster_url()))
            .send()
            .await
            .map_err(|error| SourceError::Upstream(format!("roster request failed: {error}")))?;

        if !response.status().is_success() {
            return Err(SourceError::Upstream(format!(
                "roster request returned status {}",
                response.status()
            )));
        }

        let dto: RosterDto = response
            .json()
            .await
            .map_err(|error| SourceError::Upstream(format!("roster response decode failed: {error}")))?;

        let users = dto.users.into_iter().map(User::from).collect();
        let groups = dto.groups.into_iter().map(Group::from).collect();
        Ok((users, groups))
    }

    async fn fetch_keys(&self, name: &str) -> Result<(Vec<String>, bool), SourceError> {
        let response = self
            .authorize(self.client.get(self.keys_url(name)))
            .send()
            .await
            .map_err(|error| SourceError::Upstream(format!("keys request failed for {name}: {error}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(user = %name, "upstream reports unknown user; caching empty keys");
            return Ok((Vec::new(), false));
        }

        if !response.status().is_success() {
            return Err(SourceError::Upstream(format!(
                "keys request for {name} returned status {}",
                response.status()
            )));
        }

        let dto: KeysDto = response
            .json()
            .await
            .map_err(|error| SourceError::Upstream(format!("keys response decode failed for {name}: {error}")))?;

        Ok((dto.keys, dto.sudoer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SourceConfig {
        SourceConfig {
            base_url: "https://accounts.example.internal".to_string(),
            instance_id: "vm-1".to_string(),
            bearer_token: Some("token".to_string()),
            request_timeout: std::time::Duration::from_secs(5),
        }
    }

    #[test]
    fn roster_url_embeds_instance_id() {
        let source = HttpAccountSource::new(config()).expect("client builds");
        assert_eq!(
            source.roster_url(),
            "https://accounts.example.internal/v1/instances/vm-1/roster"
        );
    }

    #[test]
    fn keys_url_embeds_instance_and_user() {
        let source = HttpAccountSource::new(config()).expect("client builds");
        assert_eq!(
            source.keys_url("alice"),
            "https://accounts.example.internal/v1/instances/vm-1/users/alice/keys"
        );
    }
}
