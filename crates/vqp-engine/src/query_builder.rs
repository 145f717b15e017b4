//! Fluent construction of well-formed queries (`spec.md` §2 component C9).
//! `build()` fills in the defaultable fields (`id`, `version`, `timestamp`)
//! and runs the same structural validation the engine applies on ingress,
//! so a caller can't hand the engine a `Query` this builder itself would
//! have rejected.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;
use vqp_types::{Query, QueryBody, ResponseMode, TypeError, QUERY_LANG_JSONLOGIC};

pub struct QueryBuilder {
    vocab: String,
    expr: Value,
    requester: Option<String>,
    target: Option<String>,
    response_mode: Option<ResponseMode>,
    id: Option<Uuid>,
    timestamp: Option<DateTime<Utc>>,
    version: Option<String>,
}

impl QueryBuilder {
    pub fn new(vocab: impl Into<String>, expr: Value) -> Self {
        Self {
            vocab: vocab.into(),
            expr,
            requester: None,
            target: None,
            response_mode: None,
            id: None,
            timestamp: None,
            version: None,
        }
    }

    pub fn requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = Some(requester.into());
        self
    }

    pub fn target(mut self, target: Option<impl Into<String>>) -> Self {
        self.target = target.map(Into::into);
        self
    }

    pub fn response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = Some(mode);
        self
    }

    /// Escape hatch for deterministic tests.
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Escape hatch for deterministic tests.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(self) -> Result<Query, TypeError> {
        let requester = self
            .requester
            .ok_or(TypeError::MissingField("requester"))?;
        if requester.trim().is_empty() {
            return Err(TypeError::MissingField("requester"));
        }
        if self.vocab.trim().is_empty() {
            return Err(TypeError::MissingField("query.vocab"));
        }
        if self.expr.is_null() {
            return Err(TypeError::MissingField("query.expr"));
        }

        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        let query = Query {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            version: self.version.unwrap_or_else(|| "1.0.0".to_string()),
            timestamp,
            requester,
            target: self.target,
            response_mode: self.response_mode,
            query: QueryBody {
                lang: QUERY_LANG_JSONLOGIC.to_string(),
                vocab: self.vocab,
                expr: self.expr,
            },
        };
        query.validate_structure(timestamp)?;
        Ok(query)
    }
}
