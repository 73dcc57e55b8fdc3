//! ActivityPub identifier and signing-key resolution.
//!
//! This crate sits between "I have a URI or identifier" and "I have a
//! local entity or key". It classifies identifiers against the server's
//! own origin, resolves them to local Note/User entities, and resolves a
//! remote actor's signing key for HTTP-signature verification, with a
//! time-gated refresh policy that bounds how often a verification attempt
//! may hit a remote server.
//!
//! Storage, remote actor fetching and HTTP transport are collaborators,
//! consumed through the ports in [`store`]; MongoDB-backed store
//! implementations live in [`db`]. The [`resolver::ApResolver`] facade is
//! the intended entry point.

pub mod cache;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod key;
pub mod model;
pub mod resolver;
pub mod store;
pub mod uri;

pub use cache::{KeyCache, MemoryKvCache};
pub use config::ResolverConfig;
pub use entity::EntityResolver;
pub use error::{ResolverError, Result};
pub use key::{AuthUserKey, KeyResolver, MainKeyStrategy, prefer_main_key};
pub use model::{Note, PublicKeyRecord, User};
pub use resolver::ApResolver;
pub use store::{NoteStore, PersonResolver, PublicKeyStore, UserStore};
pub use uri::{IdObject, Identifier, LocalUri, ParsedUri, RemoteUri, UriParser};
