//! Document addresses.
//!
//! Paths are plain slash-delimited strings that alternate collection and
//! document segments: `users/u1/analyses/a1`. Resolution is pure string
//! work, nothing is cached.

use std::fmt;

/// The address of one document: the collection it lives in plus its id.
///
/// `collection` may itself be nested (`users/u1/analyses`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: String,
    id: String,
}

impl DocumentPath {
    /// Builds a path from a collection path and a document id.
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Splits a full document path. Returns `None` unless the path has an
    /// even, non-zero number of non-empty segments.
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() < 2
            || segments.len() % 2 != 0
            || segments.iter().any(|s| s.is_empty())
        {
            return None;
        }
        let (collection, id) = path.rsplit_once('/')?;
        Some(Self::new(collection, id))
    }

    /// The collection path this document lives in.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The document id (last segment).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The path of a sub-collection under this document.
    pub fn child(&self, sub_collection: &str) -> String {
        format!("{self}/{sub_collection}")
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_collection_and_id() {
        let path = DocumentPath::new("users/u1/analyses", "a1");
        assert_eq!(path.to_string(), "users/u1/analyses/a1");
    }

    #[test]
    fn test_child_appends_sub_collection() {
        let path = DocumentPath::new("users", "u1");
        assert_eq!(path.child("analyses"), "users/u1/analyses");
    }

    #[test]
    fn test_parse_nested_path() {
        let path = DocumentPath::parse("users/u1/analyses/a1").unwrap();
        assert_eq!(path.collection(), "users/u1/analyses");
        assert_eq!(path.id(), "a1");
    }

    #[test]
    fn test_parse_rejects_collection_paths() {
        assert!(DocumentPath::parse("users").is_none());
        assert!(DocumentPath::parse("users/u1/analyses").is_none());
        assert!(DocumentPath::parse("users//analyses/a1").is_none());
        assert!(DocumentPath::parse("").is_none());
    }
}
