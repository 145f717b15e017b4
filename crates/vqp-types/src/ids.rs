//! Newtypes around plain `String`/`&str` identifiers so callers building
//! on top of this crate can't hand a vocabulary URI where a requester id
//! is expected, or vice versa. The wire types (`Query`, `QueryBody`)
//! themselves stay `String`-typed to match the canonical JSON shape;
//! these are for call sites that want the extra type-level distinction.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Requester(pub String);

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Requester {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Requester {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Requester {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VocabularyUri(pub String);

impl fmt::Display for VocabularyUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VocabularyUri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for VocabularyUri {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for VocabularyUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The data-model version this crate's wire types implement.
pub const SCHEMA_VERSION: &str = "1.0.0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requester_and_vocabulary_uri_are_distinct_types() {
        let requester: Requester = "did:example:alice".into();
        let vocab: VocabularyUri = "vqp:identity:v1".into();
        assert_eq!(requester.to_string(), "did:example:alice");
        assert_eq!(vocab.to_string(), "vqp:identity:v1");
    }
}
