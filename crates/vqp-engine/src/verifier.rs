//! The Verifier (`spec.md` §4.8): the client-side dual of the
//! `Responder`, checking a response's shape, timing, and cryptographic
//! proof without needing access to the vault or any port.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use vqp_crypto::verify as crypto_verify;
use vqp_types::{canonical_payload_bytes, Proof, Response};

/// How far into the future a response timestamp may sit, and how old it
/// may be, and still be considered fresh (`spec.md` §4.8 point 2).
pub const MAX_FUTURE_SKEW: Duration = Duration::minutes(5);
pub const MAX_AGE: Duration = Duration::hours(24);

/// `{cryptographicProof, metadata, overall}` plus human-readable mismatch
/// reasons, one per concrete check that failed, so a caller can report
/// exactly why a response didn't verify rather than a single bit.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReport {
    pub cryptographic_proof: bool,
    pub metadata: bool,
    pub overall: bool,
    pub details: Vec<String>,
}

#[derive(Default)]
pub struct Verifier;

impl Verifier {
    pub fn new() -> Self {
        Self
    }

    /// Recompute the canonical payload and check the proof alone.
    pub fn verify(&self, response: &Response) -> bool {
        let Proof::Signature { public_key, .. } = &response.proof else {
            return false;
        };
        let _ = public_key;
        let payload = canonical_payload_bytes(
            response.query_id,
            &response.result,
            response.timestamp,
            &response.responder,
            response.value.as_ref(),
        );
        crypto_verify(&response.proof, &payload).unwrap_or(false)
    }

    /// Shape and timing checks only, independent of the cryptographic
    /// proof.
    pub fn verify_metadata(&self, response: &Response, expected_query_id: Option<Uuid>) -> bool {
        self.verify_metadata_with_details(response, expected_query_id, Utc::now())
            .0
    }

    fn verify_metadata_with_details(
        &self,
        response: &Response,
        expected_query_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> (bool, Vec<String>) {
        let mut details = Vec::new();

        if !response.proof.is_well_formed() {
            details.push("proof is not well-formed".to_string());
        }
        // `multi-signature` is contract-only (`spec.md` §4.5): it may
        // parse and even be well-formed, but no implementation backs it
        // yet, so the verifier fails it explicitly rather than silently
        // reporting whatever `verify()`'s fallback happens to return.
        if matches!(response.proof, Proof::MultiSignature { .. }) {
            details.push(
                "multi-signature proofs are contract-only and not yet supported".to_string(),
            );
        }

        if let Some(expected) = expected_query_id {
            if response.query_id != expected {
                details.push(format!(
                    "queryId mismatch: expected {expected}, got {}",
                    response.query_id
                ));
            }
        }

        if response.timestamp > now + MAX_FUTURE_SKEW {
            details.push(format!(
                "response timestamp {} is more than 5 minutes in the future",
                response.timestamp
            ));
        }
        if response.timestamp < now - MAX_AGE {
            details.push(format!(
                "response timestamp {} is older than 24 hours",
                response.timestamp
            ));
        }

        (details.is_empty(), details)
    }

    /// The full tri-field verdict (`spec.md` §4.8 point 4).
    pub fn verify_complete(
        &self,
        response: &Response,
        expected_query_id: Option<Uuid>,
    ) -> VerifyReport {
        let cryptographic_proof = self.verify(response);
        let (metadata, mut details) =
            self.verify_metadata_with_details(response, expected_query_id, Utc::now());
        if !cryptographic_proof {
            details.push("cryptographic proof did not verify".to_string());
        }
        VerifyReport {
            cryptographic_proof,
            metadata,
            overall: cryptographic_proof && metadata,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vqp_crypto::{KeyRegistry, DEFAULT_KEY_ID};
    use vqp_types::SignatureAlgorithm;

    fn signed_response(value: Option<serde_json::Value>) -> Response {
        let registry = KeyRegistry::new();
        registry.ensure_default(SignatureAlgorithm::Ed25519).unwrap();
        let query_id = Uuid::new_v4();
        let timestamp = Utc::now();
        let responder = "responder-1";
        let result = serde_json::Value::Bool(true);
        let payload =
            canonical_payload_bytes(query_id, &result, timestamp, responder, value.as_ref());
        let proof = registry.sign(DEFAULT_KEY_ID, &payload).unwrap();
        Response {
            query_id,
            version: "1.0.0".to_string(),
            timestamp,
            responder: responder.to_string(),
            result,
            proof,
            value,
            consent_proof: None,
            mutual_proof: None,
            obfuscation_applied: None,
        }
    }

    #[test]
    fn verifies_a_freshly_signed_response() {
        let response = signed_response(None);
        let verifier = Verifier::new();
        let report = verifier.verify_complete(&response, Some(response.query_id));
        assert!(report.overall);
    }

    #[test]
    fn mutating_a_byte_breaks_cryptographic_proof() {
        let mut response = signed_response(None);
        let verifier = Verifier::new();
        response.result = serde_json::Value::Bool(false);
        let report = verifier.verify_complete(&response, Some(response.query_id));
        assert!(!report.cryptographic_proof);
        assert!(!report.overall);
    }

    #[test]
    fn query_id_mismatch_fails_metadata_but_not_signature() {
        let response = signed_response(None);
        let verifier = Verifier::new();
        let report = verifier.verify_complete(&response, Some(Uuid::new_v4()));
        assert!(report.cryptographic_proof);
        assert!(!report.metadata);
        assert!(!report.overall);
    }

    #[test]
    fn stale_timestamp_fails_metadata() {
        let mut response = signed_response(None);
        response.timestamp = Utc::now() - Duration::hours(48);
        let verifier = Verifier::new();
        let (ok, _) =
            verifier.verify_metadata_with_details(&response, None, Utc::now());
        assert!(!ok);
    }
}
