//! MongoDB-backed implementations of the storage ports.
//!
//! Mirrors the collection-per-entity layout used elsewhere in the stack:
//! typed collections, unique indexes on primary ids, and whole-document
//! reads. User lookups filter soft-deleted rows at the query level.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::doc,
    error::Error as MongoError,
    options::IndexOptions,
};
use thiserror::Error;

use crate::error::{ResolverError, Result};
use crate::model::{Note, PublicKeyRecord, User};
use crate::store::{NoteStore, PublicKeyStore, UserStore};

/// Database-related errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("MongoDB error: {0}")]
    MongoError(#[from] MongoError),
}

impl From<DatabaseError> for ResolverError {
    fn from(err: DatabaseError) -> Self {
        ResolverError::Storage(err.to_string())
    }
}

impl From<MongoError> for ResolverError {
    fn from(err: MongoError) -> Self {
        ResolverError::Storage(err.to_string())
    }
}

/// MongoDB-backed stores for users, notes and public keys.
pub struct MongoStores {
    database: Database,
}

impl MongoStores {
    /// Wrap an existing database handle.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn users(&self) -> Collection<User> {
        self.database.collection("users")
    }

    fn notes(&self) -> Collection<Note> {
        self.database.collection("notes")
    }

    fn public_keys(&self) -> Collection<PublicKeyRecord> {
        self.database.collection("user_public_keys")
    }

    /// Create the indexes the resolvers query against.
    pub async fn initialize(&self) -> std::result::Result<(), DatabaseError> {
        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        self.users()
            .create_index(IndexModel::builder().keys(doc! { "uri": 1 }).build())
            .await?;

        self.notes()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        self.notes()
            .create_index(IndexModel::builder().keys(doc! { "uri": 1 }).build())
            .await?;

        self.public_keys()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "key_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        self.public_keys()
            .create_index(IndexModel::builder().keys(doc! { "user_id": 1 }).build())
            .await?;

        Ok(())
    }
}

#[async_trait]
impl NoteStore for MongoStores {
    async fn find_by_local_id(&self, id: &str) -> Result<Option<Note>> {
        let note = self.notes().find_one(doc! { "id": id }).await?;
        Ok(note)
    }

    async fn find_by_remote_uri(&self, uri: &str) -> Result<Option<Note>> {
        let note = self.notes().find_one(doc! { "uri": uri }).await?;
        Ok(note)
    }
}

#[async_trait]
impl UserStore for MongoStores {
    async fn find_by_local_id(&self, id: &str) -> Result<Option<User>> {
        let user = self
            .users()
            .find_one(doc! { "id": id, "is_deleted": false })
            .await?;
        Ok(user)
    }

    async fn find_by_remote_uri(&self, uri: &str) -> Result<Option<User>> {
        let user = self
            .users()
            .find_one(doc! { "uri": uri, "is_deleted": false })
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl PublicKeyStore for MongoStores {
    async fn find_all_by_user_id(&self, user_id: &str) -> Result<Vec<PublicKeyRecord>> {
        let cursor = self.public_keys().find(doc! { "user_id": user_id }).await?;
        let keys: Vec<PublicKeyRecord> = cursor.try_collect().await.map_err(DatabaseError::from)?;
        Ok(keys)
    }
}
