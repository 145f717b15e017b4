use serde::{Deserialize, Serialize};

/// Obfuscation method for `ResponseMode::Obfuscated`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ObfuscationMethod {
    Range,
    Noise,
    Rounding,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObfuscationConfig {
    pub method: ObfuscationMethod,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub precision: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub noise_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub privacy_budget: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsensualConfig {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub justification: Option<String>,
    pub consent_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutualVerification {
    pub requester_proof: crate::proof::Proof,
    pub required_claims: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReciprocalConfig {
    pub mutual_verification: MutualVerification,
}

/// Disclosure mode selected by the requester. Absent on the wire means
/// [`ResponseMode::Strict`] (`spec.md` §4.6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "config", rename_all = "lowercase")]
pub enum ResponseMode {
    Strict,
    Consensual(ConsensualConfig),
    Reciprocal(ReciprocalConfig),
    Obfuscated(ObfuscationConfig),
}

impl Default for ResponseMode {
    fn default() -> Self {
        ResponseMode::Strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obfuscated_round_trips() {
        let mode = ResponseMode::Obfuscated(ObfuscationConfig {
            method: ObfuscationMethod::Range,
            precision: Some(100.0),
            noise_level: None,
            privacy_budget: None,
        });
        let json = serde_json::to_string(&mode).unwrap();
        let back: ResponseMode = serde_json::from_str(&json).unwrap();
        assert_eq!(mode, back);
    }

    #[test]
    fn default_is_strict() {
        assert_eq!(ResponseMode::default(), ResponseMode::Strict);
    }
}
