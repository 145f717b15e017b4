//! Optional zero-knowledge proof capability, gated behind the `zk`
//! feature: a capability set rather than a nullable method — callers
//! check [`CircuitRegistry::has_circuit`] before ever reaching for a ZK
//! proof.
//!
//! The dev-trusted-setup keys are held in-process rather than loaded
//! from an external ceremony, and the circuit is written directly
//! against `ark-relations` without `ark-r1cs-std`'s bit gadgets, since
//! that crate isn't in this workspace's dependency set.

use crate::error::CryptoError;
use ark_bls12_381::{Bls12_381, Fr};
use ark_ff::PrimeField;
use ark_groth16::{Groth16, Proof as Groth16Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::rngs::StdRng;
use ark_std::rand::SeedableRng;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashMap;
use std::sync::RwLock;

/// A circuit proving `private_value >= threshold` without revealing
/// `private_value`, identified by `vqp:threshold:v1`.
///
/// TODO: this proves non-negativity of `private_value - threshold` via a
/// single witnessed square root (`diff = root * root`), which only holds
/// over the integers if the prover is honest about `diff` being a
/// perfect square — it does not soundly range-bound `diff` to the field
/// modulus the way a bit-decomposition gadget (e.g. `ark-r1cs-std`'s
/// `UInt64`) would. Swap in a bit gadget before this leaves "honest toy"
/// status.
#[derive(Clone)]
pub struct ThresholdCircuit {
    pub private_value: Option<Fr>,
    pub threshold: Fr,
}

impl ConstraintSynthesizer<Fr> for ThresholdCircuit {
    fn generate_constraints(
        self,
        cs: ConstraintSystemRef<Fr>,
    ) -> Result<(), SynthesisError> {
        let value_var = cs.new_witness_variable(|| {
            self.private_value.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let threshold_var = cs.new_input_variable(|| Ok(self.threshold))?;

        let diff = self
            .private_value
            .map(|v| v - self.threshold)
            .ok_or(SynthesisError::AssignmentMissing);
        let root = diff.map(sqrt_witness)?;

        let root_var = cs.new_witness_variable(|| root)?;

        // root * root == value - threshold
        cs.enforce_constraint(
            ark_relations::lc!() + root_var,
            ark_relations::lc!() + root_var,
            ark_relations::lc!() + value_var - threshold_var,
        )?;
        Ok(())
    }
}

fn sqrt_witness(diff: Fr) -> Result<Fr, SynthesisError> {
    diff.sqrt().ok_or(SynthesisError::Unsatisfiable)
}

pub struct CircuitKeys {
    pub proving_key: ProvingKey<Bls12_381>,
    pub verifying_key: VerifyingKey<Bls12_381>,
}

/// Registry of known circuits, keyed by circuit id (e.g.
/// `"vqp:threshold:v1"`). Loading runs a dev-trusted setup in-process;
/// production deployments would load externally-generated keys instead
/// (`spec.md` leaves key ceremony out of scope).
#[derive(Default)]
pub struct CircuitRegistry {
    circuits: RwLock<HashMap<String, CircuitKeys>>,
}

pub const THRESHOLD_CIRCUIT_ID: &str = "vqp:threshold:v1";

impl CircuitRegistry {
    pub fn new() -> Self {
        Self {
            circuits: RwLock::new(HashMap::new()),
        }
    }

    pub fn has_circuit(&self, circuit_id: &str) -> bool {
        self.circuits
            .read()
            .expect("circuit registry lock poisoned")
            .contains_key(circuit_id)
    }

    pub fn list_circuits(&self) -> Vec<String> {
        self.circuits
            .read()
            .expect("circuit registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Dev-trusted setup for the threshold circuit, registered under
    /// [`THRESHOLD_CIRCUIT_ID`]. Deterministic seeding is the caller's
    /// responsibility for test reproducibility.
    pub fn load_threshold_circuit(&self, seed: u64) -> Result<(), CryptoError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let circuit = ThresholdCircuit {
            private_value: Some(Fr::from(0u64)),
            threshold: Fr::from(0u64),
        };
        let (proving_key, verifying_key) = Groth16::<Bls12_381>::circuit_specific_setup(
            circuit, &mut rng,
        )
        .map_err(|e| CryptoError::Zk(e.to_string()))?;
        self.circuits
            .write()
            .expect("circuit registry lock poisoned")
            .insert(
                THRESHOLD_CIRCUIT_ID.to_string(),
                CircuitKeys {
                    proving_key,
                    verifying_key,
                },
            );
        Ok(())
    }

}

pub fn generate_zk_proof(
    registry: &CircuitRegistry,
    circuit_id: &str,
    private_value: u64,
    threshold: u64,
    seed: u64,
) -> Result<Groth16Proof<Bls12_381>, CryptoError> {
    let guard = registry
        .circuits
        .read()
        .expect("circuit registry lock poisoned");
    let keys = guard
        .get(circuit_id)
        .ok_or_else(|| CryptoError::CircuitNotFound(circuit_id.to_string()))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let circuit = ThresholdCircuit {
        private_value: Some(Fr::from(private_value)),
        threshold: Fr::from(threshold),
    };
    Groth16::<Bls12_381>::prove(&keys.proving_key, circuit, &mut rng)
        .map_err(|e| CryptoError::Zk(e.to_string()))
}

pub fn verify_zk_proof(
    registry: &CircuitRegistry,
    circuit_id: &str,
    threshold: u64,
    proof: &Groth16Proof<Bls12_381>,
) -> Result<bool, CryptoError> {
    let guard = registry
        .circuits
        .read()
        .expect("circuit registry lock poisoned");
    let keys = guard
        .get(circuit_id)
        .ok_or_else(|| CryptoError::CircuitNotFound(circuit_id.to_string()))?;
    let public_inputs = [Fr::from(threshold)];
    Groth16::<Bls12_381>::verify(&keys.verifying_key, &public_inputs, proof)
        .map_err(|e| CryptoError::Zk(e.to_string()))
}

/// Proves `private_value >= threshold` and packages the result as the
/// protocol's `Proof::ZeroKnowledge` wire variant — a base64-encoded,
/// compressed `ark-serialize` blob plus the public `threshold` input, so
/// callers outside this crate never see the raw arkworks proof type.
pub fn prove_threshold_as_wire_proof(
    registry: &CircuitRegistry,
    circuit_id: &str,
    private_value: u64,
    threshold: u64,
    seed: u64,
) -> Result<vqp_types::Proof, CryptoError> {
    let proof = generate_zk_proof(registry, circuit_id, private_value, threshold, seed)?;

    let mut bytes = Vec::new();
    proof
        .serialize_compressed(&mut bytes)
        .map_err(|e| CryptoError::Zk(e.to_string()))?;

    let mut public_inputs = serde_json::Map::new();
    public_inputs.insert("threshold".to_string(), serde_json::json!(threshold));

    Ok(vqp_types::Proof::ZeroKnowledge {
        circuit: circuit_id.to_string(),
        proof: STANDARD.encode(bytes),
        public_inputs,
    })
}

/// Verifies a `Proof::ZeroKnowledge` wire proof against a registered
/// circuit. Returns an error if `proof` is not the `ZeroKnowledge`
/// variant, its `circuit` field doesn't match `circuit_id`, or its
/// `public_inputs` lack an integer `threshold`.
pub fn verify_wire_zk_proof(
    registry: &CircuitRegistry,
    circuit_id: &str,
    proof: &vqp_types::Proof,
) -> Result<bool, CryptoError> {
    let vqp_types::Proof::ZeroKnowledge {
        circuit,
        proof: encoded,
        public_inputs,
    } = proof
    else {
        return Err(CryptoError::Zk(
            "expected a zero-knowledge proof variant".to_string(),
        ));
    };
    if circuit != circuit_id {
        return Err(CryptoError::Zk(format!(
            "proof was generated for circuit '{circuit}', expected '{circuit_id}'"
        )));
    }
    let threshold = public_inputs
        .get("threshold")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| CryptoError::Zk("public_inputs missing integer 'threshold'".to_string()))?;

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| CryptoError::Zk(format!("invalid base64 proof blob: {e}")))?;
    let groth16_proof = Groth16Proof::<Bls12_381>::deserialize_compressed(&bytes[..])
        .map_err(|e| CryptoError::Zk(format!("malformed proof blob: {e}")))?;

    verify_zk_proof(registry, circuit_id, threshold, &groth16_proof)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_circuit_proves_and_verifies_when_value_meets_threshold() {
        let registry = CircuitRegistry::new();
        registry.load_threshold_circuit(42).unwrap();
        assert!(registry.has_circuit(THRESHOLD_CIRCUIT_ID));

        let proof =
            generate_zk_proof(&registry, THRESHOLD_CIRCUIT_ID, 25, 16, 7).unwrap();
        assert!(verify_zk_proof(&registry, THRESHOLD_CIRCUIT_ID, 16, &proof).unwrap());
    }

    #[test]
    fn unknown_circuit_id_is_reported() {
        let registry = CircuitRegistry::new();
        let err = generate_zk_proof(&registry, "vqp:unknown:v1", 1, 1, 1).unwrap_err();
        assert!(matches!(err, CryptoError::CircuitNotFound(_)));
    }

    #[test]
    fn wire_proof_round_trips_through_base64() {
        let registry = CircuitRegistry::new();
        registry.load_threshold_circuit(9).unwrap();

        let wire_proof =
            prove_threshold_as_wire_proof(&registry, THRESHOLD_CIRCUIT_ID, 25, 16, 3).unwrap();
        match &wire_proof {
            vqp_types::Proof::ZeroKnowledge { circuit, proof, .. } => {
                assert_eq!(circuit, THRESHOLD_CIRCUIT_ID);
                assert!(!proof.is_empty());
            }
            other => panic!("expected a zero-knowledge proof, got {other:?}"),
        }
        assert!(wire_proof.is_well_formed());
        assert!(verify_wire_zk_proof(&registry, THRESHOLD_CIRCUIT_ID, &wire_proof).unwrap());
    }

    #[test]
    fn wire_proof_rejects_circuit_id_mismatch() {
        let registry = CircuitRegistry::new();
        registry.load_threshold_circuit(9).unwrap();
        let wire_proof =
            prove_threshold_as_wire_proof(&registry, THRESHOLD_CIRCUIT_ID, 25, 16, 3).unwrap();
        let err = verify_wire_zk_proof(&registry, "vqp:other:v1", &wire_proof).unwrap_err();
        assert!(matches!(err, CryptoError::Zk(_)));
    }
}
