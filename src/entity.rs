//! Entity resolution: identifier to local Note or User.

use std::sync::Arc;

use tracing::debug;

use crate::cache::MemoryKvCache;
use crate::config::ResolverConfig;
use crate::error::Result;
use crate::model::{Note, User};
use crate::store::{NoteStore, UserStore};
use crate::uri::{Identifier, ParsedUri, UriParser};

/// Resolves parsed identifiers to local database entities, dispatching to
/// the local-id or remote-uri path. Remote user lookups go through a pair
/// of lazily populated identity caches.
pub struct EntityResolver {
    parser: UriParser,
    notes: Arc<dyn NoteStore>,
    users: Arc<dyn UserStore>,
    user_by_id_cache: MemoryKvCache<User>,
    user_by_uri_cache: MemoryKvCache<User>,
}

impl EntityResolver {
    /// Create a resolver over the given stores.
    pub fn new(
        config: &ResolverConfig,
        notes: Arc<dyn NoteStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            parser: UriParser::new(&config.base_url),
            notes,
            users,
            user_by_id_cache: MemoryKvCache::new(config.local_identity_ttl()),
            user_by_uri_cache: MemoryKvCache::new(config.remote_identity_ttl()),
        }
    }

    /// The parser this resolver classifies identifiers with.
    pub fn parser(&self) -> &UriParser {
        &self.parser
    }

    /// Resolve an identifier to a note. Absence is `Ok(None)`.
    pub async fn resolve_note(&self, identifier: &Identifier) -> Result<Option<Note>> {
        match self.parser.parse(identifier)? {
            ParsedUri::Local(local) => {
                if local.kind.as_deref() != Some("notes") {
                    return Ok(None);
                }
                match local.id {
                    Some(id) => self.notes.find_by_local_id(&id).await,
                    None => Ok(None),
                }
            }
            ParsedUri::Remote(remote) => self.notes.find_by_remote_uri(&remote.uri).await,
        }
    }

    /// Resolve an identifier to a user. Absence is `Ok(None)`.
    ///
    /// Local lookups treat a soft-deleted user as absent regardless of
    /// cache state. A remote cache hit is returned without a fresh
    /// deletion check; that staleness window is bounded by the identity
    /// cache's lifetime.
    pub async fn resolve_user(&self, identifier: &Identifier) -> Result<Option<User>> {
        match self.parser.parse(identifier)? {
            ParsedUri::Local(local) => {
                if local.kind.as_deref() != Some("users") {
                    return Ok(None);
                }
                let Some(id) = local.id else {
                    return Ok(None);
                };
                let user = self
                    .user_by_id_cache
                    .fetch_maybe(&id, || async { self.users.find_by_local_id(&id).await })
                    .await?;
                Ok(user.filter(|u| !u.is_deleted))
            }
            ParsedUri::Remote(remote) => {
                debug!(uri = %remote.uri, "resolving remote user");
                self.user_by_uri_cache
                    .fetch_maybe(&remote.uri, || async {
                        self.users.find_by_remote_uri(&remote.uri).await
                    })
                    .await
            }
        }
    }

    /// Drop all identity cache entries. Used at service shutdown.
    pub fn clear_caches(&self) {
        self.user_by_id_cache.clear();
        self.user_by_uri_cache.clear();
    }
}
