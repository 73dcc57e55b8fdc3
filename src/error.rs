//! Error types for identifier and key resolution.
//!
//! Not-found conditions are never errors in this crate; they are expressed
//! as `Ok(None)` so callers must branch on absence explicitly. The variants
//! here cover malformed input, storage failures and remote-fetch failures.

use thiserror::Error;

/// Errors produced by the resolution layer.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The identifier's declared id does not parse as an absolute URI.
    #[error("identifier is not a valid absolute URI: {0}")]
    MalformedIdentifier(#[from] url::ParseError),

    /// An identifier object was given without an `id` field.
    #[error("identifier object carries no id")]
    MissingId,

    /// A storage read or write failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The person-resolution collaborator failed to fetch or normalize a
    /// remote actor. Propagated unmodified; this crate does not retry
    /// failed remote calls.
    #[error("remote fetch failed: {0}")]
    RemoteFetch(String),
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolverError>;
