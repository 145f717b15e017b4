//! The Response Mode Shaper (`spec.md` §4.6): turns the evaluated result
//! and the underlying value into the fields a response actually
//! discloses, under one of the four disclosure modes. Runs strictly
//! before signing — the shaper never re-evaluates the predicate.

use crate::{
    error::EngineError,
    ports::{ConsentDecision, ConsentPort, ConsentRequest},
};
use serde_json::{json, Value};
use vqp_crypto::verify as crypto_verify;
use vqp_types::{ObfuscationMethod, Proof, ResponseMode};
use uuid::Uuid;

/// The disclosed fields produced by shaping, prior to signing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ShapeOutcome {
    pub value: Option<Value>,
    pub consent_proof: Option<Value>,
    pub mutual_proof: Option<Value>,
    pub obfuscation_applied: Option<Value>,
}

/// Shape `actual_value` (the underlying value the predicate referenced,
/// or the result itself when the predicate referenced nothing disclosable)
/// under `mode`.
pub fn shape(
    mode: &ResponseMode,
    query_id: Uuid,
    requester: &str,
    actual_value: &Value,
    consent_port: &dyn ConsentPort,
) -> Result<ShapeOutcome, EngineError> {
    match mode {
        ResponseMode::Strict => Ok(ShapeOutcome::default()),

        ResponseMode::Consensual(cfg) => {
            let request = ConsentRequest {
                query_id,
                justification: cfg.justification.as_deref(),
                requested_value: actual_value,
                requester,
            };
            match consent_port.request_consent(&request) {
                ConsentDecision::Granted { proof } => Ok(ShapeOutcome {
                    value: Some(actual_value.clone()),
                    consent_proof: Some(proof),
                    ..ShapeOutcome::default()
                }),
                ConsentDecision::Denied => {
                    Err(EngineError::Unauthorized("consent was denied".to_string()))
                }
            }
        }

        ResponseMode::Reciprocal(cfg) => {
            let claims_message = cfg.mutual_verification.required_claims.join(",");
            let verified = verify_requester_proof(
                &cfg.mutual_verification.requester_proof,
                claims_message.as_bytes(),
            );
            if !verified {
                return Err(EngineError::Unauthorized(
                    "requester proof did not verify for reciprocal mode".to_string(),
                ));
            }
            Ok(ShapeOutcome {
                value: Some(actual_value.clone()),
                mutual_proof: Some(json!({
                    "requesterProofVerified": true,
                    "requiredClaims": cfg.mutual_verification.required_claims,
                })),
                ..ShapeOutcome::default()
            })
        }

        ResponseMode::Obfuscated(cfg) => {
            let v = actual_value.as_f64().ok_or_else(|| {
                EngineError::EvaluationError(
                    "obfuscated mode requires a numeric underlying value".to_string(),
                )
            })?;
            let (obfuscated, applied) = match cfg.method {
                ObfuscationMethod::Range => {
                    let precision = cfg.precision.unwrap_or(1.0);
                    let (lo, hi) = range_bucket(v, precision);
                    (
                        Value::String(format!("{}-{}", format_num(lo), format_num(hi))),
                        json!({"method": "range", "precision": precision}),
                    )
                }
                ObfuscationMethod::Noise => {
                    let noise_level = cfg.noise_level.unwrap_or(0.0);
                    let noised = apply_laplace_noise(v, noise_level);
                    (
                        Value::from(noised),
                        json!({"method": "noise", "noiseLevel": noise_level}),
                    )
                }
                ObfuscationMethod::Rounding => {
                    let precision = cfg.precision.unwrap_or(1.0);
                    let rounded = (v / precision).round() * precision;
                    (
                        Value::from(rounded),
                        json!({"method": "rounding", "precision": precision}),
                    )
                }
            };
            Ok(ShapeOutcome {
                value: Some(obfuscated),
                obfuscation_applied: Some(applied),
                ..ShapeOutcome::default()
            })
        }
    }
}

fn verify_requester_proof(proof: &Proof, message: &[u8]) -> bool {
    crypto_verify(proof, message).unwrap_or(false)
}

/// The half-open bucket `[floor(v/p)*p, floor(v/p)*p + p)` from
/// `spec.md` §4.6, reported as its closed textual bounds (e.g.
/// `"1200-1300"` for `v=1250, p=100`).
fn range_bucket(v: f64, precision: f64) -> (f64, f64) {
    let lo = (v / precision).floor() * precision;
    (lo, lo + precision)
}

/// `ε ~ scale * Laplace(0, 1)`, `scale = noiseLevel * |v|`, sampled via
/// inverse-CDF from a uniform draw. `noiseLevel = 0` is special-cased to
/// avoid `0 * ln(0) = NaN` at the uniform-draw boundary and to give the
/// exact no-noise guarantee `spec.md` §8 property 3 requires.
fn apply_laplace_noise(v: f64, noise_level: f64) -> f64 {
    let scale = noise_level * v.abs();
    if scale == 0.0 {
        return v;
    }
    let u: f64 = rand::random::<f64>() - 0.5;
    let epsilon = -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln();
    v + epsilon
}

/// Drop a trailing `.0` so integer-valued buckets read as `"1200-1300"`
/// rather than `"1200.0-1300.0"`.
fn format_num(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::AlwaysDenyConsent;
    use vqp_types::{ConsensualConfig, ObfuscationConfig};

    #[test]
    fn strict_mode_discloses_nothing() {
        let outcome = shape(
            &ResponseMode::Strict,
            Uuid::nil(),
            "did:example:1",
            &Value::Bool(true),
            &AlwaysDenyConsent,
        )
        .unwrap();
        assert_eq!(outcome, ShapeOutcome::default());
    }

    #[test]
    fn consensual_mode_faults_when_denied() {
        let mode = ResponseMode::Consensual(ConsensualConfig {
            justification: None,
            consent_required: true,
        });
        let err = shape(
            &mode,
            Uuid::nil(),
            "did:example:1",
            &Value::from(42),
            &AlwaysDenyConsent,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized(_)));
    }

    #[test]
    fn range_bucket_contains_the_true_value() {
        let (lo, hi) = range_bucket(1250.0, 100.0);
        assert_eq!((lo, hi), (1200.0, 1300.0));
    }

    #[test]
    fn zero_noise_level_returns_exact_value() {
        let mode = ResponseMode::Obfuscated(ObfuscationConfig {
            method: ObfuscationMethod::Noise,
            precision: None,
            noise_level: Some(0.0),
            privacy_budget: None,
        });
        let outcome = shape(
            &mode,
            Uuid::nil(),
            "did:example:1",
            &Value::from(1250.0),
            &AlwaysDenyConsent,
        )
        .unwrap();
        assert_eq!(outcome.value, Some(Value::from(1250.0)));
    }

    #[test]
    fn rounding_mode_rounds_to_nearest_precision_multiple() {
        let mode = ResponseMode::Obfuscated(ObfuscationConfig {
            method: ObfuscationMethod::Rounding,
            precision: Some(10.0),
            noise_level: None,
            privacy_budget: None,
        });
        let outcome = shape(
            &mode,
            Uuid::nil(),
            "did:example:1",
            &Value::from(74.0),
            &AlwaysDenyConsent,
        )
        .unwrap();
        assert_eq!(outcome.value, Some(Value::from(70.0)));
    }
}
