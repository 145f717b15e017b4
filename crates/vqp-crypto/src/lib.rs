//! The Cryptographic Layer (`spec.md` §4.5): signing, verification, key
//! derivation, and — behind the `zk` feature — zero-knowledge proof
//! generation and verification.

pub mod error;
pub mod keys;
pub mod signer;

#[cfg(feature = "zk")]
pub mod zk;

pub use error::CryptoError;
pub use keys::{derive_key, KeyRegistry, DEFAULT_KEY_ID};
pub use signer::{verify, KeyPair};

#[cfg(feature = "zk")]
pub use zk::{
    generate_zk_proof, prove_threshold_as_wire_proof, verify_wire_zk_proof, verify_zk_proof,
    CircuitKeys, CircuitRegistry, ThresholdCircuit, THRESHOLD_CIRCUIT_ID,
};
