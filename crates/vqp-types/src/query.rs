use {
    crate::{error::TypeError, response_mode::ResponseMode},
    chrono::{DateTime, Duration, Utc},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    uuid::{Uuid, Version},
};

/// Query language identifier recognized in v1.x of the protocol.
pub const QUERY_LANG_JSONLOGIC: &str = "jsonlogic@1.0.0";

/// How far into the past / future a query timestamp may sit and still be
/// accepted. See `spec.md` §3, "Invariant" on `Query`.
pub const QUERY_TIMESTAMP_PAST_SKEW: Duration = Duration::minutes(5);
pub const QUERY_TIMESTAMP_FUTURE_SKEW: Duration = Duration::minutes(1);

/// The nested predicate payload of a [`Query`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryBody {
    /// Predicate language identifier, fixed to [`QUERY_LANG_JSONLOGIC`] in v1.
    pub lang: String,
    /// Vocabulary URI governing the variables referenced by `expr`.
    pub vocab: String,
    /// The predicate tree, in JsonLogic wire shape.
    pub expr: Value,
}

/// A signed request for a boolean/numeric predicate evaluation over a
/// private vault, per `spec.md` §3.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    pub id: Uuid,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub requester: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response_mode: Option<ResponseMode>,
    pub query: QueryBody,
}

impl Query {
    /// Validate the structural invariants from `spec.md` §3: presence of
    /// required fields (guaranteed by the type system except for the
    /// string ones, which can be empty), the `id`'s UUIDv4 shape, plus the
    /// timestamp window and the fixed query language.
    pub fn validate_structure(&self, now: DateTime<Utc>) -> Result<(), TypeError> {
        if self.id.get_version() != Some(Version::Random) {
            return Err(TypeError::InvalidQueryId(self.id.to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(TypeError::MissingField("version"));
        }
        if self.requester.trim().is_empty() {
            return Err(TypeError::MissingField("requester"));
        }
        if self.query.vocab.trim().is_empty() {
            return Err(TypeError::MissingField("query.vocab"));
        }
        if self.query.lang != QUERY_LANG_JSONLOGIC {
            return Err(TypeError::UnsupportedLang(self.query.lang.clone()));
        }
        if self.query.expr.is_null() {
            return Err(TypeError::MissingField("query.expr"));
        }

        let earliest = now - QUERY_TIMESTAMP_PAST_SKEW;
        let latest = now + QUERY_TIMESTAMP_FUTURE_SKEW;
        if self.timestamp < earliest || self.timestamp > latest {
            return Err(TypeError::TimestampOutOfWindow(self.timestamp.to_rfc3339()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: DateTime<Utc>) -> Query {
        Query {
            id: Uuid::new_v4(),
            version: "1.0.0".into(),
            timestamp: ts,
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

    #[test]
    fn accepts_fresh_timestamp() {
        let q = sample(Utc::now());
        assert!(q.validate_structure(Utc::now()).is_ok());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let q = sample(Utc::now() - Duration::minutes(10));
        assert_eq!(
            q.validate_structure(Utc::now()),
            Err(TypeError::TimestampOutOfWindow(q.timestamp.to_rfc3339()))
        );
    }

    #[test]
    fn rejects_future_timestamp() {
        let q = sample(Utc::now() + Duration::minutes(5));
        assert!(q.validate_structure(Utc::now()).is_err());
    }

    #[test]
    fn rejects_wrong_lang() {
        let mut q = sample(Utc::now());
        q.query.lang = "cel@1.0.0".into();
        assert_eq!(
            q.validate_structure(Utc::now()),
            Err(TypeError::UnsupportedLang("cel@1.0.0".into()))
        );
    }

    #[test]
    fn rejects_empty_requester() {
        let mut q = sample(Utc::now());
        q.requester = "".into();
        assert_eq!(
            q.validate_structure(Utc::now()),
            Err(TypeError::MissingField("requester"))
        );
    }

    #[test]
    fn rejects_non_v4_query_id() {
        let mut q = sample(Utc::now());
        // A well-formed but non-random (v1) UUID.
        q.id = Uuid::parse_str("6fa459ea-ee8a-1ca4-894e-db77e160355e").unwrap();
        assert_eq!(
            q.validate_structure(Utc::now()),
            Err(TypeError::InvalidQueryId(q.id.to_string()))
        );
    }
}
