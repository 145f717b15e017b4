//! The Responder Engine (`spec.md` §4.7): the single orchestration point
//! `processQuery(query, providedVocabulary?) -> Response`.
//!
//! State machine (tracked only as `log::debug!` breadcrumbs — the engine
//! keeps no per-query state between calls, per `spec.md` §4.7): `Received
//! -> StructurallyValid -> VocabularyResolved -> Authorized ->
//! DataGathered -> Evaluated -> Shaped -> Signed -> Logged -> Done`, with
//! any failure short-circuiting to `Failed -> LoggedFailure`.

use crate::{
    audit::{AuditEntry, AuditPort},
    config::{ProofMode, ResponderConfig},
    error::EngineError,
    mode_shaper,
    ports::{CancellationToken, ConsentPort, DataPort, Signer, VocabularyPort, ZkProver},
};
use chrono::{Duration, Utc};
use std::collections::BTreeSet;
use vqp_eval::{extract_variables, parse_within_budget, evaluate, EvalError, VarMap};
use vqp_types::{canonical_payload_bytes, Proof, Query, Response, PROTOCOL_VERSION};
use vqp_vocab::{is_allowed, VocabError, VocabSchema};

pub struct Responder {
    config: ResponderConfig,
    vocab_port: Box<dyn VocabularyPort>,
    data_port: Box<dyn DataPort>,
    signer: Box<dyn Signer>,
    audit_port: Box<dyn AuditPort>,
    consent_port: Box<dyn ConsentPort>,
    cancellation: Box<dyn CancellationToken>,
    zk_capability: Option<Box<dyn ZkProver>>,
}

impl Responder {
    /// Fails fast with `ConfigurationError` when `config.proof_mode` is
    /// `ZeroKnowledge` but no `zk_capability` was supplied, rather than
    /// discovering the missing capability at signing time (`spec.md`
    /// §4.5 REDESIGN FLAGS).
    pub fn new(
        config: ResponderConfig,
        vocab_port: Box<dyn VocabularyPort>,
        data_port: Box<dyn DataPort>,
        signer: Box<dyn Signer>,
        audit_port: Box<dyn AuditPort>,
        consent_port: Box<dyn ConsentPort>,
        cancellation: Box<dyn CancellationToken>,
        zk_capability: Option<Box<dyn ZkProver>>,
    ) -> Result<Self, EngineError> {
        if matches!(config.proof_mode, ProofMode::ZeroKnowledge { .. }) && zk_capability.is_none()
        {
            return Err(EngineError::ConfigurationError(
                "proof_mode is zero-knowledge but no ZK capability was supplied".to_string(),
            ));
        }
        Ok(Self {
            config,
            vocab_port,
            data_port,
            signer,
            audit_port,
            consent_port,
            cancellation,
            zk_capability,
        })
    }

    /// The engine's sole externally visible operation (`spec.md` §6).
    pub fn process_query(
        &self,
        query: &Query,
        provided_vocabulary: Option<VocabSchema>,
    ) -> Result<Response, EngineError> {
        log::debug!("stage=Received query_id={}", query.id);
        self.audit(AuditEntry::query_received(query.id, query.requester.clone()));

        match self.process_query_inner(query, provided_vocabulary) {
            Ok(response) => {
                log::debug!("stage=Logged query_id={}", query.id);
                self.audit(AuditEntry::query_processed(
                    query.id,
                    query.requester.clone(),
                    response.result.clone(),
                ));
                log::info!("stage=Done query_id={}", query.id);
                Ok(response)
            }
            Err(err) => {
                self.audit(AuditEntry::error_occurred(Some(query.id), err.to_string()));
                log::warn!(
                    "stage=LoggedFailure query_id={} fault={}",
                    query.id,
                    err.fault_kind()
                );
                Err(err)
            }
        }
    }

    fn audit(&self, entry: AuditEntry) {
        if let Err(e) = self.audit_port.record(entry) {
            log::warn!("audit port failed, continuing: {e}");
        }
    }

    fn process_query_inner(
        &self,
        query: &Query,
        provided_vocabulary: Option<VocabSchema>,
    ) -> Result<Response, EngineError> {
        if self.cancellation.is_cancelled() {
            return Err(EngineError::EvaluationError(
                "cancelled before processing began".to_string(),
            ));
        }

        // Received -> StructurallyValid
        query.validate_structure(Utc::now())?;
        log::debug!("stage=StructurallyValid query_id={}", query.id);

        // StructurallyValid -> VocabularyResolved
        let vocab_uri = &query.query.vocab;
        // A schema handed directly to `process_query` short-circuits the
        // vocabulary port entirely (spec.md §4.3); in that case only the
        // engine's own configured allow-list still applies.
        let schema = match provided_vocabulary {
            Some(schema) => {
                let configured_allows = self.config.allowed_vocabularies.is_empty()
                    || self
                        .config
                        .allowed_vocabularies
                        .iter()
                        .any(|c| c == "*" || c == vocab_uri);
                if !configured_allows {
                    return Err(EngineError::Unauthorized(format!(
                        "vocabulary '{vocab_uri}' is not allowed"
                    )));
                }
                schema
            }
            None => {
                let schema = self
                    .vocab_port
                    .resolve(vocab_uri)
                    .map_err(|e| vocab_error_to_engine(&e))?;
                if !is_allowed(&self.config.allowed_vocabularies, self.vocab_port.as_ref(), vocab_uri)
                {
                    return Err(EngineError::Unauthorized(format!(
                        "vocabulary '{vocab_uri}' is not allowed"
                    )));
                }
                schema
            }
        };
        log::debug!("stage=VocabularyResolved query_id={}", query.id);

        if self.cancellation.is_cancelled() {
            return Err(EngineError::EvaluationError("cancelled mid-processing".to_string()));
        }

        // Parse the predicate once at ingress (REDESIGN FLAGS).
        let expr = parse_within_budget(&query.query.expr, self.config.max_query_complexity)
            .map_err(|e| eval_error_to_engine(&e))?;
        let variables: BTreeSet<String> = extract_variables(&expr);

        // Authorized: every referenced field must be vocabulary-declared
        // and access-policy-approved before any vault path is touched.
        for field in &variables {
            if !schema.allows_field(field) {
                return Err(EngineError::Unauthorized(
                    VocabError::UnknownField {
                        field: field.clone(),
                        vocab: vocab_uri.clone(),
                    }
                    .to_string(),
                ));
            }
            let vault_path = self
                .config
                .mapping_strategy
                .to_vault_path(field, vocab_uri)
                .join(".");
            if !self.data_port.validate_data_access(&vault_path, &query.requester) {
                return Err(EngineError::Unauthorized(format!(
                    "requester '{}' is not authorized for path '{vault_path}'",
                    query.requester
                )));
            }
        }
        log::debug!("stage=Authorized query_id={}", query.id);

        // DataGathered: missing paths are tolerated, becoming undefined
        // in the evaluator's input (spec.md §4.7 ordering rule 4).
        let mut vars = VarMap::new();
        for field in &variables {
            let vault_path = self
                .config
                .mapping_strategy
                .to_vault_path(field, vocab_uri)
                .join(".");
            if let Some(value) = self.data_port.get_data(&vault_path) {
                vars.insert(field.clone(), value);
            }
        }
        log::debug!("stage=DataGathered query_id={}", query.id);

        // Evaluated
        let result = evaluate(&expr, &vars);
        log::debug!("stage=Evaluated query_id={}", query.id);

        // Shaped
        let mode = query.response_mode.clone().unwrap_or_default();
        let actual_value = primary_value(&variables, &vars, &result);
        let outcome = mode_shaper::shape(
            &mode,
            query.id,
            &query.requester,
            &actual_value,
            self.consent_port.as_ref(),
        )?;
        log::debug!("stage=Shaped query_id={}", query.id);

        if self.cancellation.is_cancelled() {
            return Err(EngineError::EvaluationError(
                "cancelled before signing".to_string(),
            ));
        }

        // Signed: timestamp and responder identity are fixed immediately
        // before signing (spec.md §4.7 ordering rule 6), and the
        // response timestamp must be strictly after the query's.
        let mut response_timestamp = Utc::now();
        if response_timestamp <= query.timestamp {
            response_timestamp = query.timestamp + Duration::milliseconds(1);
        }
        let payload_bytes = canonical_payload_bytes(
            query.id,
            &result,
            response_timestamp,
            &self.config.responder_id,
            outcome.value.as_ref(),
        );
        let proof: Proof = match &self.config.proof_mode {
            ProofMode::Signature => self
                .signer
                .sign(&payload_bytes)
                .map_err(|e| EngineError::SignatureFailed(e.to_string()))?,
            ProofMode::ZeroKnowledge { threshold } => {
                // Construction already guarantees this is `Some`.
                let prover = self.zk_capability.as_deref().ok_or_else(|| {
                    EngineError::ConfigurationError(
                        "proof_mode is zero-knowledge but no ZK capability is configured"
                            .to_string(),
                    )
                })?;
                // Proved over `actual_value`, the underlying value the
                // predicate referenced, never over `outcome.value`: the
                // point of a ZK proof is that this number stays private
                // even when the disclosure mode would otherwise reveal it.
                let private_value = actual_value.as_u64().ok_or_else(|| {
                    EngineError::EvaluationError(
                        "zero-knowledge proof mode requires an underlying non-negative integer value"
                            .to_string(),
                    )
                })?;
                prover
                    .prove_threshold(private_value, *threshold)
                    .map_err(|e| EngineError::CryptoError(e.to_string()))?
            }
        };
        // `multi-signature` is contract-only (`spec.md` §4.5): no `Signer`
        // or `ZkProver` in this workspace produces it, but a third-party
        // implementation might, so the engine still checks.
        if let Proof::MultiSignature { .. } = &proof {
            return Err(EngineError::ConfigurationError(
                "multi-signature proofs are contract-only and not yet supported".to_string(),
            ));
        }
        log::debug!("stage=Signed query_id={}", query.id);

        Ok(Response {
            query_id: query.id,
            version: PROTOCOL_VERSION.to_string(),
            timestamp: response_timestamp,
            responder: self.config.responder_id.clone(),
            result,
            proof,
            value: outcome.value,
            consent_proof: outcome.consent_proof,
            mutual_proof: outcome.mutual_proof,
            obfuscation_applied: outcome.obfuscation_applied,
        })
    }
}

/// The mode shaper discloses a single "actual value": the first
/// (lexicographically smallest) variable the predicate referenced, or the
/// evaluated result itself when the predicate referenced none. This is a
/// deliberate scope decision (recorded in `DESIGN.md`) for predicates that
/// reference more than one field.
fn primary_value(
    variables: &BTreeSet<String>,
    vars: &VarMap,
    result: &serde_json::Value,
) -> serde_json::Value {
    variables
        .iter()
        .next()
        .map(|field| vars.get(field).into_value())
        .filter(|v| !v.is_null())
        .unwrap_or_else(|| result.clone())
}

fn vocab_error_to_engine(err: &VocabError) -> EngineError {
    match err {
        VocabError::NotFound(_) => EngineError::VocabularyNotFound(err.to_string()),
        VocabError::NotAuthorized(_) => EngineError::Unauthorized(err.to_string()),
        VocabError::InvalidSchema { .. } => EngineError::ConfigurationError(err.to_string()),
        VocabError::UnknownField { .. } => EngineError::Unauthorized(err.to_string()),
    }
}

fn eval_error_to_engine(err: &EvalError) -> EngineError {
    match err {
        // Exceeding the complexity budget is a query-shape problem, not
        // an evaluation fault (spec.md §4.2).
        EvalError::ComplexityExceeded { .. } => EngineError::InvalidQuery(err.to_string()),
        _ => EngineError::EvaluationError(err.to_string()),
    }
}
