//! Canonical wire types for the Verifiable Query Protocol, and the codec
//! used to produce the exact bytes a response's proof is bound to.
//!
//! This crate has no knowledge of evaluation, vocabulary resolution,
//! vaults, or signing mechanics — it only fixes the shapes everything else
//! agrees on.

pub mod canonical;
pub mod error;
pub mod ids;
pub mod proof;
pub mod query;
pub mod response;
pub mod response_mode;

pub use canonical::canonical_payload_bytes;
pub use error::TypeError;
pub use ids::{Requester, VocabularyUri, SCHEMA_VERSION};
pub use proof::{Proof, SignatureAlgorithm, SubSignature};
pub use query::{Query, QueryBody, QUERY_LANG_JSONLOGIC};
pub use response::Response;
pub use response_mode::{
    ConsensualConfig, MutualVerification, ObfuscationConfig, ObfuscationMethod, ReciprocalConfig,
    ResponseMode,
};

/// Protocol version emitted in `Query`/`Response` envelopes.
pub const PROTOCOL_VERSION: &str = "1.0.0";
