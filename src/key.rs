//! Signing-key resolution for HTTP-signature verification.
//!
//! Given a remote actor URI and an optional key identifier, produces the
//! matching public key. When no key identifier is given, a naming-convention
//! heuristic picks the actor's main key. When the requested key identifier
//! is missing from cached data, a staged re-fetch runs: first a cache-only
//! reload (one extra storage read, no network), then a remote renewal of the
//! actor document. Each stage is gated by the staleness threshold and runs
//! at most once per call. The thresholds bound how often a verification attempt
//! can hit a remote server; a stale "no key" answer is preferred over
//! unbounded retries.

use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::cache::KeyCache;
use crate::config::ResolverConfig;
use crate::error::Result;
use crate::model::{PublicKeyRecord, User};
use crate::store::{PersonResolver, PublicKeyStore};

/// A resolved actor together with the selected key, if any.
///
/// `key: None` means the actor is valid but the requested key cannot be
/// verified; callers can still record who the actor is.
#[derive(Debug, Clone)]
pub struct AuthUserKey {
    pub user: User,
    pub key: Option<PublicKeyRecord>,
}

/// Strategy for picking an actor's main key out of its key list.
///
/// The selection is string/URL-shape matching, not protocol-specified, so
/// it stays substitutable without touching the retry machinery.
pub type MainKeyStrategy = for<'a> fn(&'a [PublicKeyRecord]) -> Option<&'a PublicKeyRecord>;

/// Default main-key heuristic.
///
/// Per key: if its identifier URI carries a fragment, match when the
/// fragment contains `main` case-insensitively; otherwise match when the
/// last path segment contains `main` or equals `publickey`,
/// case-insensitively. A key identifier that fails to parse as a URI is
/// skipped, never fatal.
pub fn prefer_main_key(keys: &[PublicKeyRecord]) -> Option<&PublicKeyRecord> {
    keys.iter().find(|key| {
        let Ok(url) = Url::parse(&key.key_id) else {
            return false;
        };
        if let Some(fragment) = url.fragment().filter(|f| !f.is_empty()) {
            return fragment.to_lowercase().contains("main");
        }
        let Some(segment) = url.path_segments().and_then(|s| s.last()) else {
            return false;
        };
        let segment = segment.to_lowercase();
        segment.contains("main") || segment == "publickey"
    })
}

/// Resolves a remote actor's signing key for signature verification.
pub struct KeyResolver {
    persons: Arc<dyn PersonResolver>,
    keys: Arc<dyn PublicKeyStore>,
    cache: Arc<KeyCache>,
    main_key_strategy: MainKeyStrategy,
    staleness_threshold: chrono::Duration,
}

impl KeyResolver {
    /// Create a resolver with the default main-key heuristic.
    pub fn new(
        config: &ResolverConfig,
        persons: Arc<dyn PersonResolver>,
        keys: Arc<dyn PublicKeyStore>,
        cache: Arc<KeyCache>,
    ) -> Self {
        Self {
            persons,
            keys,
            cache,
            main_key_strategy: prefer_main_key,
            staleness_threshold: config.key_staleness_threshold(),
        }
    }

    /// Substitute the main-key selection strategy.
    pub fn with_main_key_strategy(mut self, strategy: MainKeyStrategy) -> Self {
        self.main_key_strategy = strategy;
        self
    }

    /// Load a user's key list through the cache.
    async fn load_keys(&self, user_id: &str) -> Result<Option<Vec<PublicKeyRecord>>> {
        self.cache
            .fetch_or_load(user_id, || async {
                let keys = self.keys.find_all_by_user_id(user_id).await?;
                Ok(Some(keys))
            })
            .await
    }

    /// Drop and reload the key cache entry, then search for an exact
    /// key-id match.
    async fn reload_and_find(
        &self,
        user_id: &str,
        key_id: &str,
    ) -> Result<Option<PublicKeyRecord>> {
        self.cache.invalidate(user_id);
        let keys = self.load_keys(user_id).await?;
        Ok(keys
            .as_deref()
            .and_then(|keys| find_exact(keys, key_id))
            .cloned())
    }

    /// Resolve the actor at `uri` and select a signing key.
    ///
    /// `Ok(None)` means the actor does not resolve or is soft-deleted;
    /// deleted actors never authenticate. A resolved actor without a
    /// usable key yields `AuthUserKey { key: None }`.
    pub async fn resolve_auth_user(
        &self,
        uri: &str,
        key_id: Option<&str>,
    ) -> Result<Option<AuthUserKey>> {
        let user = self.persons.resolve_person(uri, None, true).await?;
        if user.is_deleted {
            warn!(uri = %uri, "refusing to authenticate deleted actor");
            return Ok(None);
        }

        let Some(keys) = self.load_keys(&user.id).await? else {
            return Ok(Some(AuthUserKey { user, key: None }));
        };

        let Some(key_id) = key_id else {
            let key = (self.main_key_strategy)(&keys).or_else(|| keys.first()).cloned();
            return Ok(Some(AuthUserKey { user, key }));
        };

        if let Some(key) = find_exact(&keys, key_id) {
            return Ok(Some(AuthUserKey {
                user,
                key: Some(key.clone()),
            }));
        }

        // Cache-only reload tier: one extra storage read, never network.
        if let Some(inserted_at) = self.cache.inserted_at(&user.id)
            && chrono::Utc::now() - inserted_at < self.staleness_threshold
        {
            debug!(user_id = %user.id, key_id = %key_id, "key not in fresh cache, reloading from storage");
            if let Some(key) = self.reload_and_find(&user.id, key_id).await? {
                return Ok(Some(AuthUserKey {
                    user,
                    key: Some(key),
                }));
            }
        }

        // Remote renewal tier: the only tier that issues network I/O.
        let needs_renewal = user
            .last_fetched_at
            .is_none_or(|fetched_at| chrono::Utc::now() - fetched_at > self.staleness_threshold);
        if needs_renewal {
            debug!(uri = %uri, "renewing actor document for missing key");
            let Some(renewed) = self.persons.fetch_person_with_renewal(uri, 0).await? else {
                return Ok(None);
            };
            if renewed.is_deleted {
                warn!(uri = %uri, "actor deleted during renewal");
                return Ok(None);
            }
            let key = self.reload_and_find(&renewed.id, key_id).await?;
            return Ok(Some(AuthUserKey { user: renewed, key }));
        }

        Ok(Some(AuthUserKey { user, key: None }))
    }
}

fn find_exact<'a>(keys: &'a [PublicKeyRecord], key_id: &str) -> Option<&'a PublicKeyRecord> {
    keys.iter().find(|key| key.key_id == key_id)
}
