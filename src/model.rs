//! Domain entities consumed from storage.
//!
//! These are the rows the resolvers read; they are owned by the storage
//! layer and never partially updated here. `User::last_fetched_at` and
//! `User::is_deleted` drive the key refresh protocol in [`crate::key`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account, local or remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Local primary key.
    pub id: String,

    /// Preferred username (local part).
    pub username: String,

    /// Host this user belongs to; `None` for local accounts.
    pub host: Option<String>,

    /// Canonical ActivityPub URI; `None` for local accounts.
    pub uri: Option<String>,

    /// Soft-deletion flag. A deleted user never authenticates and is
    /// treated as absent by user resolution.
    pub is_deleted: bool,

    /// When the remote actor document was last fetched; `None` for local
    /// accounts or never-fetched remotes.
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl User {
    /// True for accounts that live on this server.
    pub fn is_local(&self) -> bool {
        self.host.is_none()
    }
}

/// A note (post), local or remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Local primary key.
    pub id: String,

    /// Author's local user id.
    pub user_id: String,

    /// Canonical ActivityPub URI; `None` for local notes.
    pub uri: Option<String>,

    /// Content/body of the note.
    pub content: Option<String>,
}

/// A remote actor's public signing key.
///
/// Immutable once fetched; a refresh supersedes the whole list for a user,
/// individual records are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    /// Local user id of the key owner.
    pub user_id: String,

    /// Remote key identifier URI, as announced by the actor document.
    pub key_id: String,

    /// PEM-encoded key material. Opaque to this crate.
    pub key_pem: String,
}
