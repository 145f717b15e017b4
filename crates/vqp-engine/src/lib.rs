//! The Responder Engine, Response Mode Shaper, Verifier, and Query
//! Builder (`spec.md` §4.6-§4.9): the orchestration layer tying together
//! `vqp-types`, `vqp-eval`, `vqp-vocab`, `vqp-vault`, and `vqp-crypto`.

pub mod audit;
pub mod config;
pub mod error;
pub mod mode_shaper;
pub mod ports;
pub mod query_builder;
pub mod responder;
pub mod verifier;

pub use audit::{AuditEntry, AuditEvent, AuditPort, LoggingAuditSink, RecordingAuditSink};
pub use config::{KeyDerivationConfig, ProofMode, ResponderConfig};
pub use error::EngineError;
pub use mode_shaper::ShapeOutcome;
pub use ports::{
    AlwaysDenyConsent, CancellationToken, ConsentDecision, ConsentPort, ConsentRequest, DataPort,
    DefaultSigner, FlagCancellationToken, NeverCancelled, Signer, VocabularyPort, ZkProver,
};

#[cfg(feature = "zk")]
pub use ports::ThresholdZkProver;
pub use query_builder::QueryBuilder;
pub use responder::Responder;
pub use verifier::{VerifyReport, Verifier, MAX_AGE, MAX_FUTURE_SKEW};
