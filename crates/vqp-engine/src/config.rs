//! `ResponderConfig`: the environment-controlled parameters a deployment
//! tunes at startup — a plain `serde`-deserializable struct loadable from
//! JSON or TOML, constructed once and handed to the `Responder`.

use serde::{Deserialize, Serialize};
use vqp_types::SignatureAlgorithm;
use vqp_vocab::MappingStrategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDerivationConfig {
    pub iterations: u32,
    pub key_length: usize,
}

impl Default for KeyDerivationConfig {
    fn default() -> Self {
        Self {
            iterations: 100_000,
            key_length: 32,
        }
    }
}

fn default_mapping_strategy() -> MappingStrategy {
    MappingStrategy::Standard
}

fn default_complexity() -> usize {
    vqp_eval::DEFAULT_COMPLEXITY_BUDGET
}

fn default_signature_algorithm() -> SignatureAlgorithm {
    SignatureAlgorithm::Ed25519
}

/// Which proof kind this responder produces (`spec.md` §4.5 supplement).
/// `ZeroKnowledge` requires a [`crate::ports::ZkProver`] to be supplied to
/// the `Responder`; absent one, construction fails fast with
/// `ConfigurationError` rather than the signing step failing per-query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProofMode {
    Signature,
    ZeroKnowledge {
        /// Public threshold the disclosed value must meet or exceed.
        threshold: u64,
    },
}

impl Default for ProofMode {
    fn default() -> Self {
        ProofMode::Signature
    }
}

/// `rateLimits` lives on `vqp_vault::AccessPolicy` instead of here, since
/// it's enforced inside the vault's `validateDataAccess`, not by the
/// engine directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponderConfig {
    /// Identifier this responder signs and reports as `responder` in
    /// every response.
    pub responder_id: String,

    /// Node-count cap on the predicate tree (`spec.md` §4.2).
    #[serde(default = "default_complexity")]
    pub max_query_complexity: usize,

    /// Non-empty means only these URIs (or `"*"`) may be queried, in
    /// addition to whatever the vocabulary port itself admits.
    #[serde(default)]
    pub allowed_vocabularies: Vec<String>,

    #[serde(default)]
    pub key_derivation: KeyDerivationConfig,

    /// Whether `EncryptedVaultStore::get_data` memoizes resolved vault
    /// paths. Disable this for vaults whose backing file may be mutated
    /// out of band between queries, where a stale cached lookup would be
    /// wrong rather than merely slow.
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    #[serde(default = "default_mapping_strategy")]
    pub mapping_strategy: MappingStrategy,

    #[serde(default = "default_signature_algorithm")]
    pub signature_algorithm: SignatureAlgorithm,

    #[serde(default)]
    pub proof_mode: ProofMode,
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            responder_id: "vqp-responder".to_string(),
            max_query_complexity: default_complexity(),
            allowed_vocabularies: Vec::new(),
            key_derivation: KeyDerivationConfig::default(),
            cache_enabled: default_cache_enabled(),
            mapping_strategy: default_mapping_strategy(),
            signature_algorithm: default_signature_algorithm(),
            proof_mode: ProofMode::default(),
        }
    }
}
