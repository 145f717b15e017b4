use serde::{Deserialize, Serialize};

/// Signature algorithms recognized by the `Signature` proof variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    Ed25519,
    Secp256k1,
    #[serde(rename = "rsa-pss")]
    RsaPss,
}

/// A cryptographic proof bound to a response, tagged by `type`.
///
/// `MultiSignature` is a contract-only variant: it parses, but the engine
/// and verifier reject it with a configuration/metadata failure until an
/// implementation actually supports threshold signing (see `spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Proof {
    #[serde(rename = "signature")]
    Signature {
        algorithm: SignatureAlgorithm,
        /// Hex- or base58-encoded public key.
        public_key: String,
        /// Hex-encoded signature bytes.
        signature: String,
    },
    #[serde(rename = "zero-knowledge")]
    ZeroKnowledge {
        circuit: String,
        /// Opaque, scheme-specific proof blob, base64-encoded.
        proof: String,
        public_inputs: serde_json::Map<String, serde_json::Value>,
    },
    #[serde(rename = "multi-signature")]
    MultiSignature {
        threshold: u32,
        signatures: Vec<SubSignature>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubSignature {
    pub algorithm: SignatureAlgorithm,
    pub public_key: String,
    pub signature: String,
}

impl Proof {
    pub fn is_well_formed(&self) -> bool {
        match self {
            Proof::Signature {
                public_key,
                signature,
                ..
            } => !public_key.is_empty() && !signature.is_empty(),
            Proof::ZeroKnowledge { circuit, proof, .. } => !circuit.is_empty() && !proof.is_empty(),
            Proof::MultiSignature {
                threshold,
                signatures,
            } => *threshold > 0 && (*threshold as usize) <= signatures.len(),
        }
    }
}
