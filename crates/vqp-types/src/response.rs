use {
    crate::{error::TypeError, proof::Proof, query::Query},
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    uuid::Uuid,
};

/// A signed answer to a [`Query`], per `spec.md` §3.
///
/// `value`, `consent_proof`, `mutual_proof` and `obfuscation_applied` are
/// only present when the chosen [`crate::ResponseMode`] disclosed them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub query_id: Uuid,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub responder: String,
    pub result: Value,
    pub proof: Proof,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub consent_proof: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mutual_proof: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub obfuscation_applied: Option<Value>,
}

impl Response {
    /// Checks the response-level invariants from `spec.md` §3 that do not
    /// require recomputing or verifying the proof itself: `queryId` binding
    /// and monotonic timestamp ordering relative to the originating query.
    pub fn validate_against_query(&self, query: &Query) -> Result<(), TypeError> {
        if self.query_id != query.id {
            return Err(TypeError::QueryIdMismatch);
        }
        if self.timestamp <= query.timestamp {
            return Err(TypeError::ResponseNotAfterQuery);
        }
        if !self.proof.is_well_formed() {
            return Err(TypeError::MalformedProof("proof shape invalid".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            proof::{Proof, SignatureAlgorithm},
            query::{QueryBody, QUERY_LANG_JSONLOGIC},
        },
        chrono::Duration,
    };

    fn base_query() -> Query {
        Query {
            id: Uuid::new_v4(),
            version: "1.0.0".into(),
            timestamp: Utc::now(),
            requester: "did:example:123".into(),
            target: None,
            response_mode: None,
            query: QueryBody {
                lang: QUERY_LANG_JSONLOGIC.into(),
                vocab: "vqp:identity:v1".into(),
                expr: serde_json::json!({">=": [{"var": "age"}, 18]}),
            },
        }
    }

    fn base_proof() -> Proof {
        Proof::Signature {
            algorithm: SignatureAlgorithm::Ed25519,
            public_key: "ab".repeat(16),
            signature: "cd".repeat(32),
        }
    }

    #[test]
    fn accepts_well_formed_response() {
        let query = base_query();
        let response = Response {
            query_id: query.id,
            version: "1.0.0".into(),
            timestamp: query.timestamp + Duration::seconds(1),
            responder: "responder-1".into(),
            result: Value::Bool(true),
            proof: base_proof(),
            value: None,
            consent_proof: None,
            mutual_proof: None,
            obfuscation_applied: None,
        };
        assert!(response.validate_against_query(&query).is_ok());
    }

    #[test]
    fn rejects_query_id_mismatch() {
        let query = base_query();
        let mut response = Response {
            query_id: Uuid::new_v4(),
            version: "1.0.0".into(),
            timestamp: query.timestamp + Duration::seconds(1),
            responder: "responder-1".into(),
            result: Value::Bool(true),
            proof: base_proof(),
            value: None,
            consent_proof: None,
            mutual_proof: None,
            obfuscation_applied: None,
        };
        assert_eq!(
            response.validate_against_query(&query),
            Err(TypeError::QueryIdMismatch)
        );
        response.query_id = query.id;
        response.timestamp = query.timestamp;
        assert_eq!(
            response.validate_against_query(&query),
            Err(TypeError::ResponseNotAfterQuery)
        );
    }
}
