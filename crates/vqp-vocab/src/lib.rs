//! Vocabulary resolution, allow-listing, and field→vault-path mapping
//! for the Verifiable Query Protocol (`spec.md` §4.3).

pub mod error;
pub mod mapping;
pub mod resolver;
pub mod schema;

pub use error::VocabError;
pub use mapping::MappingStrategy;
pub use resolver::{is_allowed, BuiltinVocabularyResolver, VocabularyPort};
pub use schema::VocabSchema;
