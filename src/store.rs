//! Storage and person-resolution ports.
//!
//! The resolvers consume these as constructor parameters; implementations
//! live elsewhere (see [`crate::db`] for the MongoDB-backed ones). All
//! absences are `Ok(None)`, never errors.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Note, PublicKeyRecord, User};
use crate::uri::IdObject;

/// Port for note lookups.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Find a note by its local primary key.
    async fn find_by_local_id(&self, id: &str) -> Result<Option<Note>>;

    /// Find a note by its stored remote URI.
    async fn find_by_remote_uri(&self, uri: &str) -> Result<Option<Note>>;
}

/// Port for user lookups. Both operations filter soft-deleted rows.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a non-deleted user by local primary key.
    async fn find_by_local_id(&self, id: &str) -> Result<Option<User>>;

    /// Find a non-deleted user by stored remote URI.
    async fn find_by_remote_uri(&self, uri: &str) -> Result<Option<User>>;
}

/// Port for public-key lookups.
#[async_trait]
pub trait PublicKeyStore: Send + Sync {
    /// All known public keys for a user. Empty list, not an absence, when
    /// none exist.
    async fn find_all_by_user_id(&self, user_id: &str) -> Result<Vec<PublicKeyRecord>>;
}

/// Port for the remote-actor-fetching/normalization service.
///
/// Implementations may perform network I/O and write-through to stores;
/// their failures propagate unmodified through the resolvers.
#[async_trait]
pub trait PersonResolver: Send + Sync {
    /// Resolve the actor at `uri`. A caller already holding the actor
    /// object may pass it as `hint` to spare the implementation a fetch;
    /// `force_fetch` requests a best-effort remote fetch rather than a
    /// purely cached answer.
    async fn resolve_person(
        &self,
        uri: &str,
        hint: Option<&IdObject>,
        force_fetch: bool,
    ) -> Result<User>;

    /// Re-fetch the actor document at `uri`, ignoring freshness caches.
    /// `None` when the actor no longer exists remotely.
    async fn fetch_person_with_renewal(&self, uri: &str, depth: u32) -> Result<Option<User>>;
}
