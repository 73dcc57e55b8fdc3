//! Identifier parsing and local/remote classification.
//!
//! Maps a protocol identifier (a bare absolute-URI string or an object
//! declaring its own `id`) onto either a reference into this server's own
//! namespace or an opaque remote URI. Pure string/URL work, no I/O.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{ResolverError, Result};

/// An identifier accepted by the resolvers: either a bare absolute-URI
/// string, or a protocol object that declares its own `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// A bare URI string.
    Uri(String),

    /// A protocol object carrying an `id` field.
    Object(IdObject),
}

impl Identifier {
    /// Extract the canonical id string.
    ///
    /// An object form without an `id` is a malformed-input error, never
    /// silently defaulted.
    pub fn id(&self) -> Result<&str> {
        match self {
            Identifier::Uri(uri) => Ok(uri),
            Identifier::Object(obj) => obj.id.as_deref().ok_or(ResolverError::MissingId),
        }
    }
}

impl From<&str> for Identifier {
    fn from(uri: &str) -> Self {
        Identifier::Uri(uri.to_string())
    }
}

/// Object form of an identifier. Only `id` matters to resolution; every
/// other property rides along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdObject {
    /// The object's declared id, an absolute URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Additional properties not inspected by this crate.
    #[serde(flatten)]
    pub additional_properties: HashMap<String, Value>,
}

/// A reference into this server's own namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalUri {
    /// Path segment hint, e.g. `"notes"` or `"users"`. `None` when the
    /// path is too short to carry one; downstream treats that as a miss.
    pub kind: Option<String>,

    /// Entity id segment. `None` on too-short paths.
    pub id: Option<String>,

    /// Remaining path segments joined by `/`, `None` when there are none.
    pub rest: Option<String>,
}

/// An opaque reference to another server's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUri {
    /// The normalized href.
    pub uri: String,
}

/// Classification of an identifier against this server's origin.
///
/// Produced fresh per call; exactly one variant applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedUri {
    Local(LocalUri),
    Remote(RemoteUri),
}

/// Parses identifiers against a configured canonical origin.
#[derive(Debug, Clone)]
pub struct UriParser {
    base_origin: String,
}

impl UriParser {
    /// Create a parser for the given canonical base URL of this server.
    pub fn new(base_url: &Url) -> Self {
        Self {
            base_origin: base_url.origin().ascii_serialization(),
        }
    }

    /// Parse an identifier into its local/remote classification.
    pub fn parse(&self, identifier: &Identifier) -> Result<ParsedUri> {
        self.parse_uri_str(identifier.id()?)
    }

    /// Parse a bare URI string into its local/remote classification.
    ///
    /// Total over syntactically valid absolute URIs: a same-origin path of
    /// any shape parses, with too-short paths yielding `None` fields.
    pub fn parse_uri_str(&self, uri: &str) -> Result<ParsedUri> {
        let url = Url::parse(uri)?;

        if url.origin().ascii_serialization() != self.base_origin {
            return Ok(ParsedUri::Remote(RemoteUri {
                uri: url.to_string(),
            }));
        }

        let mut segments = url
            .path_segments()
            .map(|s| s.map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter();

        let kind = segments.next().filter(|s| !s.is_empty());
        let id = segments.next().filter(|s| !s.is_empty());
        let rest = {
            let tail = segments.collect::<Vec<_>>();
            if tail.is_empty() {
                None
            } else {
                Some(tail.join("/"))
            }
        };

        Ok(ParsedUri::Local(LocalUri { kind, id, rest }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> UriParser {
        UriParser::new(&Url::parse("https://example.com").unwrap())
    }

    #[test]
    fn test_parse_local_with_rest() {
        let parsed = parser()
            .parse_uri_str("https://example.com/notes/abc123/activity/history")
            .unwrap();
        assert_eq!(
            parsed,
            ParsedUri::Local(LocalUri {
                kind: Some("notes".to_string()),
                id: Some("abc123".to_string()),
                rest: Some("activity/history".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_local_without_rest() {
        let parsed = parser()
            .parse_uri_str("https://example.com/users/9xyz")
            .unwrap();
        assert_eq!(
            parsed,
            ParsedUri::Local(LocalUri {
                kind: Some("users".to_string()),
                id: Some("9xyz".to_string()),
                rest: None,
            })
        );
    }

    #[test]
    fn test_parse_local_too_short() {
        let parsed = parser().parse_uri_str("https://example.com/").unwrap();
        assert_eq!(
            parsed,
            ParsedUri::Local(LocalUri {
                kind: None,
                id: None,
                rest: None,
            })
        );
    }

    #[test]
    fn test_parse_remote() {
        let parsed = parser()
            .parse_uri_str("https://remote.test/users/alice")
            .unwrap();
        assert_eq!(
            parsed,
            ParsedUri::Remote(RemoteUri {
                uri: "https://remote.test/users/alice".to_string(),
            })
        );
    }

    #[test]
    fn test_different_port_is_remote() {
        let parsed = parser()
            .parse_uri_str("https://example.com:8443/notes/abc")
            .unwrap();
        assert!(matches!(parsed, ParsedUri::Remote(_)));
    }

    #[test]
    fn test_object_identifier() {
        let json = r#"{"id": "https://example.com/notes/n1", "type": "Note"}"#;
        let identifier: Identifier = serde_json::from_str(json).unwrap();
        assert_eq!(identifier.id().unwrap(), "https://example.com/notes/n1");

        let parsed = parser().parse(&identifier).unwrap();
        assert!(matches!(parsed, ParsedUri::Local(_)));
    }

    #[test]
    fn test_object_without_id_is_an_error() {
        let identifier = Identifier::Object(IdObject {
            id: None,
            additional_properties: HashMap::new(),
        });
        assert!(matches!(identifier.id(), Err(ResolverError::MissingId)));
    }

    #[test]
    fn test_invalid_uri_is_an_error() {
        let err = parser().parse_uri_str("not a uri").unwrap_err();
        assert!(matches!(err, ResolverError::MalformedIdentifier(_)));
    }
}
