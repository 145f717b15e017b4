//! Zero-knowledge proof-mode coverage, gated behind the `zk` feature
//! (`spec.md` §4.5 supplement).

#![cfg(feature = "zk")]

use serde_json::json;
use tempfile::tempdir;
use vqp_engine::{
    AlwaysDenyConsent, DefaultSigner, NeverCancelled, ProofMode, QueryBuilder, RecordingAuditSink,
    Responder, ResponderConfig, ThresholdZkProver, Verifier,
};
use vqp_types::{Proof, SignatureAlgorithm};
use vqp_vault::{AccessPolicy, DefaultPolicy, EncryptedVaultStore};
use vqp_vocab::BuiltinVocabularyResolver;

fn allow_all_policy() -> AccessPolicy {
    AccessPolicy {
        default_policy: DefaultPolicy::Allow,
        ..AccessPolicy::default()
    }
}

fn make_vault(initial_data: serde_json::Value) -> EncryptedVaultStore {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.json");
    std::mem::forget(dir);
    EncryptedVaultStore::create(
        &path,
        "correct horse battery staple",
        100_000,
        32,
        allow_all_policy(),
        initial_data,
        true,
    )
    .unwrap()
}

#[test]
fn threshold_query_produces_a_verifiable_zero_knowledge_proof() {
    let vault = make_vault(json!({"personal": {"age": 25}}));
    let prover = ThresholdZkProver::new(11).unwrap();

    let responder = Responder::new(
        ResponderConfig {
            responder_id: "vqp-responder-zk-test".to_string(),
            proof_mode: ProofMode::ZeroKnowledge { threshold: 18 },
            ..ResponderConfig::default()
        },
        Box::new(BuiltinVocabularyResolver::new()),
        Box::new(vault),
        Box::new(DefaultSigner::new(SignatureAlgorithm::Ed25519)),
        Box::new(RecordingAuditSink::new()),
        Box::new(AlwaysDenyConsent),
        Box::new(NeverCancelled),
        Some(Box::new(prover)),
    )
    .unwrap();

    let query = QueryBuilder::new("vqp:identity:v1", json!({">=": [{"var": "age"}, 18]}))
        .requester("did:example:alice")
        .build()
        .unwrap();

    let response = responder.process_query(&query, None).unwrap();
    assert_eq!(response.result, json!(true));
    match &response.proof {
        Proof::ZeroKnowledge { circuit, .. } => assert_eq!(circuit, "vqp:threshold:v1"),
        other => panic!("expected a zero-knowledge proof, got {other:?}"),
    }

    // The verifier's `verify()` recomputes the canonical payload and
    // checks a `Signature` proof; it has no circuit registry to check a
    // `ZeroKnowledge` proof against, so the cryptographic leg reports
    // false while metadata (shape, timing) still passes.
    let report = Verifier::new().verify_complete(&response, Some(query.id));
    assert!(!report.cryptographic_proof);
    assert!(report.metadata);
}
