//! Resolver configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the resolution layer, supplied by the composition
/// root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Canonical base URL of this server; its origin classifies
    /// identifiers as local or remote.
    pub base_url: Url,

    /// Lifetime of the by-local-id identity cache, in seconds.
    #[serde(default = "default_local_identity_ttl_secs")]
    pub local_identity_ttl_secs: i64,

    /// Lifetime of the by-remote-uri identity cache, in seconds.
    #[serde(default = "default_remote_identity_ttl_secs")]
    pub remote_identity_ttl_secs: i64,

    /// Window bounding how often a single verification attempt may trigger
    /// a key-cache reload or a remote renewal, in seconds.
    #[serde(default = "default_key_staleness_secs")]
    pub key_staleness_secs: i64,
}

fn default_local_identity_ttl_secs() -> i64 {
    5 * 60
}

fn default_remote_identity_ttl_secs() -> i64 {
    30 * 60
}

fn default_key_staleness_secs() -> i64 {
    12 * 60
}

impl ResolverConfig {
    /// Configuration with default cache lifetimes for the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            local_identity_ttl_secs: default_local_identity_ttl_secs(),
            remote_identity_ttl_secs: default_remote_identity_ttl_secs(),
            key_staleness_secs: default_key_staleness_secs(),
        }
    }

    /// Lifetime of the by-local-id identity cache.
    pub fn local_identity_ttl(&self) -> Duration {
        Duration::seconds(self.local_identity_ttl_secs)
    }

    /// Lifetime of the by-remote-uri identity cache.
    pub fn remote_identity_ttl(&self) -> Duration {
        Duration::seconds(self.remote_identity_ttl_secs)
    }

    /// The staleness threshold gating key-cache reloads and remote
    /// renewals.
    pub fn key_staleness_threshold(&self) -> Duration {
        Duration::seconds(self.key_staleness_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_omitted() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{"base_url": "https://example.com"}"#).unwrap();
        assert_eq!(config.key_staleness_threshold(), Duration::minutes(12));
        assert_eq!(config.local_identity_ttl(), Duration::minutes(5));
        assert_eq!(config.remote_identity_ttl(), Duration::minutes(30));
    }
}
