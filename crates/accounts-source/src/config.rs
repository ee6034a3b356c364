//! Connection settings for [`crate::HttpAccountSource`].

/// Where and how to reach the remote user-accounts REST API.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL, e.g. `https://accounts.example.internal`.
    pub base_url: String,
    /// The cloud VM instance this daemon resolves identities for; embedded
    /// in both endpoint paths.
    pub instance_id: String,
    /// Bearer token sent as `Authorization: Bearer <token>` on every
    /// request, if set.
    pub bearer_token: Option<String>,
    /// Per-request timeout.
    pub request_timeout: std::time::Duration,
}
