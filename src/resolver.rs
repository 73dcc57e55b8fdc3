//! The resolution facade wired up by the composition root.

use std::sync::Arc;

use crate::cache::KeyCache;
use crate::config::ResolverConfig;
use crate::entity::EntityResolver;
use crate::error::Result;
use crate::key::{AuthUserKey, KeyResolver, MainKeyStrategy};
use crate::model::{Note, PublicKeyRecord, User};
use crate::store::{NoteStore, PersonResolver, PublicKeyStore, UserStore};
use crate::uri::{Identifier, ParsedUri};

/// Resolves protocol identifiers to local entities and remote actors'
/// signing keys.
///
/// Process-wide: the key cache inside is shared across all callers. All
/// operations are re-entrant; concurrent population of the same cache key
/// may load more than once (see [`crate::cache`]).
pub struct ApResolver {
    entities: EntityResolver,
    keys: KeyResolver,
    key_store: Arc<dyn PublicKeyStore>,
    key_cache: Arc<KeyCache>,
}

impl ApResolver {
    /// Wire up the resolver from its collaborators.
    pub fn new(
        config: &ResolverConfig,
        notes: Arc<dyn NoteStore>,
        users: Arc<dyn UserStore>,
        public_keys: Arc<dyn PublicKeyStore>,
        persons: Arc<dyn PersonResolver>,
    ) -> Self {
        let key_cache = Arc::new(KeyCache::new());
        Self {
            entities: EntityResolver::new(config, notes, users),
            keys: KeyResolver::new(config, persons, public_keys.clone(), key_cache.clone()),
            key_store: public_keys,
            key_cache,
        }
    }

    /// Substitute the main-key selection strategy.
    pub fn with_main_key_strategy(mut self, strategy: MainKeyStrategy) -> Self {
        self.keys = self.keys.with_main_key_strategy(strategy);
        self
    }

    /// Classify an identifier as local or remote. Pure, no I/O.
    pub fn parse_uri(&self, identifier: &Identifier) -> Result<ParsedUri> {
        self.entities.parser().parse(identifier)
    }

    /// Resolve an identifier to a local note entity.
    pub async fn resolve_note_from_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<Note>> {
        self.entities.resolve_note(identifier).await
    }

    /// Resolve an identifier to a local user entity.
    pub async fn resolve_user_from_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<User>> {
        self.entities.resolve_user(identifier).await
    }

    /// Resolve the remote actor at `uri` and select a signing key for
    /// HTTP-signature verification.
    pub async fn resolve_auth_user_from_uri(
        &self,
        uri: &str,
        key_id: Option<&str>,
    ) -> Result<Option<AuthUserKey>> {
        self.keys.resolve_auth_user(uri, key_id).await
    }

    /// The cached list of a user's known public keys, loading it from
    /// storage on a cache miss.
    pub async fn get_public_keys_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<Vec<PublicKeyRecord>>> {
        self.key_cache
            .fetch_or_load(user_id, || async {
                let keys = self.key_store.find_all_by_user_id(user_id).await?;
                Ok(Some(keys))
            })
            .await
    }

    /// Drop the cached key list for a user; the next read reloads it.
    pub fn invalidate_keys_for_user(&self, user_id: &str) {
        self.key_cache.invalidate(user_id);
    }

    /// Release cache state at orderly service shutdown. Safe to call with
    /// no entries and safe to call more than once.
    pub fn shutdown(&self) {
        self.key_cache.dispose_all();
        self.entities.clear_caches();
    }
}
