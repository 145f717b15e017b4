//! Vocabulary resolution port and the built-in resolver implementation.

use crate::{error::VocabError, schema};
use crate::schema::VocabSchema;
use std::{collections::HashMap, sync::RwLock};

/// Suspension point for resolving a vocabulary URI to a schema.
///
/// Modeled as a synchronous trait per the engine's port convention
/// (`spec.md` §5): a real deployment backs this with a network call or a
/// database lookup; the engine itself only ever calls through the trait.
pub trait VocabularyPort: Send + Sync {
    fn resolve(&self, uri: &str) -> Result<VocabSchema, VocabError>;

    /// Whether this port is willing to serve `uri` at all, independent of
    /// the engine's own configured allow-list.
    fn is_vocabulary_allowed(&self, uri: &str) -> bool;

    /// Last-writer-wins cache insert (`spec.md` §5 shared-resource policy).
    fn cache_vocabulary(&self, schema: VocabSchema);
}

/// Resolves the eight standard `vqp:<domain>:v1` vocabularies from an
/// in-memory registry, with a read-mostly cache for anything inserted via
/// [`VocabularyPort::cache_vocabulary`].
pub struct BuiltinVocabularyResolver {
    cache: RwLock<HashMap<String, VocabSchema>>,
}

impl BuiltinVocabularyResolver {
    pub fn new() -> Self {
        let builtins = [
            schema::identity_v1(),
            schema::financial_v1(),
            schema::health_v1(),
            schema::metrics_v1(),
            schema::academic_v1(),
            schema::compliance_v1(),
            schema::iot_v1(),
            schema::supply_chain_v1(),
        ];
        let cache = builtins
            .into_iter()
            .map(|s| (s.uri().to_string(), s))
            .collect();
        Self {
            cache: RwLock::new(cache),
        }
    }
}

impl Default for BuiltinVocabularyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl VocabularyPort for BuiltinVocabularyResolver {
    fn resolve(&self, uri: &str) -> Result<VocabSchema, VocabError> {
        self.cache
            .read()
            .expect("vocabulary cache lock poisoned")
            .get(uri)
            .cloned()
            .ok_or_else(|| VocabError::NotFound(uri.to_string()))
    }

    fn is_vocabulary_allowed(&self, uri: &str) -> bool {
        self.cache
            .read()
            .expect("vocabulary cache lock poisoned")
            .contains_key(uri)
    }

    fn cache_vocabulary(&self, schema: VocabSchema) {
        self.cache
            .write()
            .expect("vocabulary cache lock poisoned")
            .insert(schema.uri().to_string(), schema);
    }
}

/// Enforce the engine's configured allow-list alongside the port's own
/// opinion (`spec.md` §4.3): a `*` entry in `configured` permits anything
/// the port itself admits; otherwise the URI must appear in both.
pub fn is_allowed(configured: &[String], port: &dyn VocabularyPort, uri: &str) -> bool {
    let port_allows = port.is_vocabulary_allowed(uri);
    if configured.is_empty() {
        return port_allows;
    }
    let configured_allows = configured.iter().any(|c| c == "*" || c == uri);
    configured_allows && port_allows
}
