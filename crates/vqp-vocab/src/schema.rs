//! Vocabulary schemas: JSON-Schema-Draft-2020-12-shaped documents that
//! name the fields a predicate may reference, never used to validate
//! vault data itself (`spec.md` §4.3).

use crate::error::VocabError;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct VocabSchema {
    uri: String,
    document: Value,
}

impl VocabSchema {
    /// Build a schema, rejecting documents that are not themselves valid
    /// Draft 2020-12 schemas. This validates the *schema* document
    /// itself, not instance data — vault data is never validated against
    /// it; only field names and declared types are read off of it.
    pub fn new(uri: impl Into<String>, document: Value) -> Result<Self, VocabError> {
        let uri = uri.into();
        jsonschema::draft202012::new(&document).map_err(|e| VocabError::InvalidSchema {
            uri: uri.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { uri, document })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Whether `field` appears in the schema's declared `properties`.
    pub fn allows_field(&self, field: &str) -> bool {
        self.document
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.contains_key(field))
            .unwrap_or(false)
    }

    /// The declared scalar type (`"integer"`, `"string"`, ...) of `field`,
    /// if the schema names one.
    pub fn field_type(&self, field: &str) -> Option<&str> {
        self.document
            .pointer(&format!("/properties/{field}/type"))
            .and_then(Value::as_str)
    }

    /// Every field name the schema declares.
    pub fn declared_fields(&self) -> Vec<&str> {
        self.document
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

macro_rules! builtin_schema {
    ($fn_name:ident, $uri:literal, $document:tt) => {
        pub fn $fn_name() -> VocabSchema {
            VocabSchema::new($uri, serde_json::json!($document))
                .expect("built-in vocabulary schema must be a valid Draft 2020-12 document")
        }
    };
}

builtin_schema!(identity_v1, "vqp:identity:v1", {
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "VQP Identity Vocabulary v1",
    "type": "object",
    "properties": {
        "age": {"type": "integer", "minimum": 0, "maximum": 150},
        "date_of_birth": {"type": "string", "format": "date"},
        "citizenship": {"type": "string"},
        "residency_country": {"type": "string"},
        "is_over_18": {"type": "boolean"},
        "is_over_21": {"type": "boolean"}
    }
});

builtin_schema!(financial_v1, "vqp:financial:v1", {
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "VQP Financial Vocabulary v1",
    "type": "object",
    "properties": {
        "annual_income": {"type": "number", "minimum": 0},
        "employment_status": {
            "type": "string",
            "enum": ["employed", "self_employed", "unemployed", "retired", "student"]
        },
        "credit_score": {"type": "integer", "minimum": 300, "maximum": 850},
        "has_bankruptcy": {"type": "boolean"}
    }
});

builtin_schema!(health_v1, "vqp:health:v1", {
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "VQP Health Vocabulary v1",
    "type": "object",
    "properties": {
        "vaccinations_completed": {"type": "array", "items": {"type": "string"}},
        "blood_type": {"type": "string"},
        "allergies": {"type": "array", "items": {"type": "string"}},
        "has_chronic_condition": {"type": "boolean"}
    }
});

builtin_schema!(metrics_v1, "vqp:metrics:v1", {
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "VQP Metrics Vocabulary v1",
    "type": "object",
    "properties": {
        "cpu_usage_percent": {"type": "number", "minimum": 0, "maximum": 100},
        "memory_usage_percent": {"type": "number", "minimum": 0, "maximum": 100},
        "uptime_seconds": {"type": "integer", "minimum": 0},
        "processed_events_last_hour": {"type": "integer", "minimum": 0},
        "is_healthy": {"type": "boolean"}
    }
});

builtin_schema!(academic_v1, "vqp:academic:v1", {
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "VQP Academic Vocabulary v1",
    "type": "object",
    "properties": {
        "degree_level": {
            "type": "string",
            "enum": ["none", "highschool", "bachelor", "master", "doctorate"]
        },
        "gpa": {"type": "number", "minimum": 0, "maximum": 4.0},
        "graduation_year": {"type": "integer"},
        "is_enrolled": {"type": "boolean"}
    }
});

builtin_schema!(compliance_v1, "vqp:compliance:v1", {
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "VQP Compliance Vocabulary v1",
    "type": "object",
    "properties": {
        "kyc_verified": {"type": "boolean"},
        "aml_risk_tier": {"type": "string", "enum": ["low", "medium", "high"]},
        "sanctions_checked": {"type": "boolean"},
        "jurisdiction": {"type": "string"}
    }
});

builtin_schema!(iot_v1, "vqp:iot:v1", {
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "VQP IoT Vocabulary v1",
    "type": "object",
    "properties": {
        "firmware_version": {"type": "string"},
        "battery_percent": {"type": "number", "minimum": 0, "maximum": 100},
        "last_seen_seconds_ago": {"type": "integer", "minimum": 0},
        "is_tamper_flagged": {"type": "boolean"}
    }
});

builtin_schema!(supply_chain_v1, "vqp:supply-chain:v1", {
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "VQP Supply Chain Vocabulary v1",
    "type": "object",
    "properties": {
        "origin_country": {"type": "string"},
        "certified_organic": {"type": "boolean"},
        "carbon_footprint_kg": {"type": "number", "minimum": 0},
        "custody_chain_length": {"type": "integer", "minimum": 0}
    }
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_builtin_schemas_compile_and_declare_fields() {
        let schemas = [
            identity_v1(),
            financial_v1(),
            health_v1(),
            metrics_v1(),
            academic_v1(),
            compliance_v1(),
            iot_v1(),
            supply_chain_v1(),
        ];
        for schema in &schemas {
            assert!(!schema.declared_fields().is_empty());
        }
    }

    #[test]
    fn identity_schema_gates_expected_fields() {
        let schema = identity_v1();
        assert!(schema.allows_field("age"));
        assert_eq!(schema.field_type("age"), Some("integer"));
        assert!(!schema.allows_field("annual_income"));
    }

    #[test]
    fn invalid_document_is_rejected() {
        let result = VocabSchema::new("vqp:broken:v1", serde_json::json!({"type": 42}));
        assert!(result.is_err());
    }
}
