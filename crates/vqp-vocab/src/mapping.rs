//! Field-to-vault-path mapping strategies (`spec.md` §4.3).
//!
//! The vocabulary field a predicate names (e.g. `age`) need not match the
//! vault's on-disk layout (e.g. `personal.age`). A [`MappingStrategy`] is
//! a pure, injected policy translating between the two; it never touches
//! the vault or the network.

/// The two built-in mapping strategies required by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStrategy {
    /// Identity mapping: the vault path *is* the field, split on `.`.
    Flat,
    /// Known vocabulary-specific prefixes, e.g. identity fields nest
    /// under `personal.*`, metrics under `system.*`.
    Standard,
}

impl MappingStrategy {
    /// Translate a vocabulary field into the vault path segments used to
    /// look it up.
    pub fn to_vault_path(&self, field: &str, vocab_uri: &str) -> Vec<String> {
        match self {
            MappingStrategy::Flat => field.split('.').map(str::to_string).collect(),
            MappingStrategy::Standard => {
                let mut segments = vec![standard_prefix(vocab_uri).to_string()];
                segments.extend(field.split('.').map(str::to_string));
                segments
            }
        }
    }

    /// The inverse of [`Self::to_vault_path`]: recover the vocabulary
    /// field name a vault path segment sequence corresponds to.
    pub fn to_vocabulary_field(&self, segments: &[String], vocab_uri: &str) -> String {
        match self {
            MappingStrategy::Flat => segments.join("."),
            MappingStrategy::Standard => {
                let prefix = standard_prefix(vocab_uri);
                match segments.split_first() {
                    Some((first, rest)) if first == prefix => rest.join("."),
                    _ => segments.join("."),
                }
            }
        }
    }
}

fn standard_prefix(vocab_uri: &str) -> &'static str {
    match vocab_uri {
        "vqp:identity:v1" => "personal",
        "vqp:financial:v1" => "financial",
        "vqp:health:v1" => "health",
        "vqp:metrics:v1" => "system",
        "vqp:academic:v1" => "academic",
        "vqp:compliance:v1" => "compliance",
        "vqp:iot:v1" => "iot",
        "vqp:supply-chain:v1" => "supply_chain",
        _ => "data",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_strategy_splits_on_dots() {
        let segments = MappingStrategy::Flat.to_vault_path("financial.annual_income", "vqp:financial:v1");
        assert_eq!(segments, vec!["financial", "annual_income"]);
    }

    #[test]
    fn standard_strategy_prefixes_identity_under_personal() {
        let segments = MappingStrategy::Standard.to_vault_path("age", "vqp:identity:v1");
        assert_eq!(segments, vec!["personal", "age"]);
    }

    #[test]
    fn standard_strategy_prefixes_metrics_under_system() {
        let segments = MappingStrategy::Standard.to_vault_path("cpu_usage_percent", "vqp:metrics:v1");
        assert_eq!(segments, vec!["system", "cpu_usage_percent"]);
    }

    #[test]
    fn standard_strategy_round_trips() {
        let segments = MappingStrategy::Standard.to_vault_path("age", "vqp:identity:v1");
        let field = MappingStrategy::Standard.to_vocabulary_field(&segments, "vqp:identity:v1");
        assert_eq!(field, "age");
    }
}
