//! The single cross-layer fault-conversion boundary (`spec.md` §7,
//! §9 REDESIGN FLAGS: "the engine has exactly one place that maps
//! layer-specific faults to the external taxonomy"). Every lower-layer
//! error type (`vqp_types::TypeError`, `vqp_eval::EvalError`,
//! `vqp_vocab::VocabError`, `vqp_vault::VaultError`,
//! `vqp_crypto::CryptoError`) is converted into one of these variants
//! somewhere in `responder.rs` or `verifier.rs` — never re-exported
//! directly to a caller.

use thiserror::Error;
use vqp_types::TypeError;

/// The closed set of externally visible fault kinds from `spec.md` §7.
/// `NETWORK_ERROR` is a transport-surface concern and has no variant
/// here, since this crate never touches a transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("evaluation error: {0}")]
    EvaluationError(String),

    #[error("signature failed: {0}")]
    SignatureFailed(String),

    #[error("vocabulary not found: {0}")]
    VocabularyNotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("crypto error: {0}")]
    CryptoError(String),

    #[error("configuration error: {0}")]
    ConfigurationError(String),
}

impl EngineError {
    /// The machine-readable fault kind string, exactly as named in
    /// `spec.md` §7 — what a CLI wrapper prints on `stderr` (§6).
    pub fn fault_kind(&self) -> &'static str {
        match self {
            EngineError::InvalidQuery(_) => "INVALID_QUERY",
            EngineError::EvaluationError(_) => "EVALUATION_ERROR",
            EngineError::SignatureFailed(_) => "SIGNATURE_FAILED",
            EngineError::VocabularyNotFound(_) => "VOCABULARY_NOT_FOUND",
            EngineError::Unauthorized(_) => "UNAUTHORIZED",
            EngineError::RateLimited(_) => "RATE_LIMITED",
            EngineError::CryptoError(_) => "CRYPTO_ERROR",
            EngineError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }
}

impl From<TypeError> for EngineError {
    fn from(err: TypeError) -> Self {
        EngineError::InvalidQuery(err.to_string())
    }
}

/// `vqp-vault`'s decryption/IO faults surface internally as crypto
/// faults but externally as `EVALUATION_ERROR` (`spec.md` §4.4: "decryption
/// faults surface as CRYPTO_ERROR to the engine, which then surfaces them
/// as EVALUATION_ERROR in the externally visible taxonomy").
impl From<vqp_vault::VaultError> for EngineError {
    fn from(err: vqp_vault::VaultError) -> Self {
        EngineError::EvaluationError(err.to_string())
    }
}
