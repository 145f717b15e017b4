//! Suspension points the engine calls through (`spec.md` §5): every
//! operation here "may suspend". Modeled as plain synchronous traits — a
//! real deployment backs any of these with blocking I/O, or with
//! `futures::executor::block_on` if the embedding application is async.

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use vqp_crypto::CryptoError;
use vqp_types::Proof;

pub use vqp_vocab::VocabularyPort;

/// The Data Access Layer's engine-facing contract (`spec.md` §4.4):
/// `getData`, `hasData`, `validateDataAccess`. Missing paths are `None`,
/// never a fault.
pub trait DataPort: Send + Sync {
    fn get_data(&self, dotted_path: &str) -> Option<Value>;
    fn has_data(&self, dotted_path: &str) -> bool;
    fn validate_data_access(&self, dotted_path: &str, requester: &str) -> bool;
}

/// Lets an `Arc`-shared data port (e.g. a test double a caller wants to
/// inspect after the fact) be handed to a `Responder` as a `Box<dyn
/// DataPort>`, mirroring the `AuditPort` blanket impl in `audit.rs`.
impl<T: DataPort + ?Sized> DataPort for std::sync::Arc<T> {
    fn get_data(&self, dotted_path: &str) -> Option<Value> {
        (**self).get_data(dotted_path)
    }

    fn has_data(&self, dotted_path: &str) -> bool {
        (**self).has_data(dotted_path)
    }

    fn validate_data_access(&self, dotted_path: &str, requester: &str) -> bool {
        (**self).validate_data_access(dotted_path, requester)
    }
}

impl DataPort for vqp_vault::EncryptedVaultStore {
    fn get_data(&self, dotted_path: &str) -> Option<Value> {
        vqp_vault::EncryptedVaultStore::get_data(self, dotted_path)
    }

    fn has_data(&self, dotted_path: &str) -> bool {
        vqp_vault::EncryptedVaultStore::has_data(self, dotted_path)
    }

    fn validate_data_access(&self, dotted_path: &str, requester: &str) -> bool {
        vqp_vault::EncryptedVaultStore::validate_data_access(self, dotted_path, requester)
    }
}

/// The Crypto Layer's signing contract as the engine sees it: `sign` over
/// the canonical payload bytes, using whatever key id the implementation
/// considers "default" (`spec.md` §4.5).
pub trait Signer: Send + Sync {
    fn sign(&self, message: &[u8]) -> Result<Proof, CryptoError>;
}

/// Signs with the registry's lazily-materialized `"default"` keypair
/// under a fixed algorithm, per `spec.md` §4.5 ("the engine signs with
/// `default` unless configured otherwise").
pub struct DefaultSigner {
    registry: vqp_crypto::KeyRegistry,
    algorithm: vqp_types::SignatureAlgorithm,
}

impl DefaultSigner {
    pub fn new(algorithm: vqp_types::SignatureAlgorithm) -> Self {
        Self {
            registry: vqp_crypto::KeyRegistry::new(),
            algorithm,
        }
    }

    pub fn public_key_hex(&self) -> Result<String, CryptoError> {
        self.registry.ensure_default(self.algorithm)?;
        self.registry.public_key_hex(vqp_crypto::DEFAULT_KEY_ID)
    }
}

impl Signer for DefaultSigner {
    fn sign(&self, message: &[u8]) -> Result<Proof, CryptoError> {
        self.registry.sign_default(self.algorithm, message)
    }
}

/// `{query, justification, requestedValue, requester}` handed to the
/// consent port for a `consensual`-mode disclosure (`spec.md` §4.6).
pub struct ConsentRequest<'a> {
    pub query_id: uuid::Uuid,
    pub justification: Option<&'a str>,
    pub requested_value: &'a Value,
    pub requester: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsentDecision {
    Granted { proof: Value },
    Denied,
}

/// Suspension point asking a data subject whether a consensual
/// disclosure may proceed.
pub trait ConsentPort: Send + Sync {
    fn request_consent(&self, request: &ConsentRequest<'_>) -> ConsentDecision;
}

/// A consent port that always denies, useful as a safe default when no
/// consensual-mode deployment collaborator is wired up.
pub struct AlwaysDenyConsent;

impl ConsentPort for AlwaysDenyConsent {
    fn request_consent(&self, _request: &ConsentRequest<'_>) -> ConsentDecision {
        ConsentDecision::Denied
    }
}

/// Observed at every suspension point (`spec.md` §5): on cancellation
/// mid-processing, partial state is discarded without a response.
pub trait CancellationToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// A token that can be flipped from outside the engine call, e.g. by a
/// transport wrapper reacting to a client disconnect.
#[derive(Default)]
pub struct FlagCancellationToken(AtomicBool);

impl FlagCancellationToken {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl CancellationToken for FlagCancellationToken {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The default token for single-shot, non-cancellable calls (most tests
/// and the CLI).
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Zero-knowledge proving capability (`spec.md` §4.5, REDESIGN FLAGS:
/// `ZkCapable: Signer` as a capability set rather than a nullable method
/// on `Signer` itself). A build without the `zk` feature has no type
/// implementing this trait in scope, so a `Responder` configured for
/// `ProofMode::ZeroKnowledge` without one supplied fails at construction
/// rather than at proof time.
pub trait ZkProver: Send + Sync {
    fn circuit_id(&self) -> &str;
    fn prove_threshold(&self, private_value: u64, threshold: u64) -> Result<Proof, CryptoError>;
}

/// The shipped `vqp:threshold:v1` circuit (`spec.md` §4.5 supplement),
/// wrapping a dev-trusted-setup [`vqp_crypto::CircuitRegistry`].
#[cfg(feature = "zk")]
pub struct ThresholdZkProver {
    registry: vqp_crypto::CircuitRegistry,
    seed: u64,
}

#[cfg(feature = "zk")]
impl ThresholdZkProver {
    pub fn new(seed: u64) -> Result<Self, CryptoError> {
        let registry = vqp_crypto::CircuitRegistry::new();
        registry.load_threshold_circuit(seed)?;
        Ok(Self { registry, seed })
    }
}

#[cfg(feature = "zk")]
impl ZkProver for ThresholdZkProver {
    fn circuit_id(&self) -> &str {
        vqp_crypto::THRESHOLD_CIRCUIT_ID
    }

    fn prove_threshold(&self, private_value: u64, threshold: u64) -> Result<Proof, CryptoError> {
        vqp_crypto::prove_threshold_as_wire_proof(
            &self.registry,
            vqp_crypto::THRESHOLD_CIRCUIT_ID,
            private_value,
            threshold,
            self.seed,
        )
    }
}
