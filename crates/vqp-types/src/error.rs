use thiserror::Error;

/// Structural validation failures surfaced while parsing a wire-format query
/// or response. These map 1:1 onto the externally visible `INVALID_QUERY`
/// fault kind once they reach the engine boundary (see `vqp-engine`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' is malformed: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("query id '{0}' is not a valid UUIDv4")]
    InvalidQueryId(String),

    #[error("timestamp '{0}' is not a valid RFC 3339 timestamp")]
    InvalidTimestamp(String),

    #[error("timestamp {0} is outside the accepted window [now-5m, now+1m]")]
    TimestampOutOfWindow(String),

    #[error("unsupported query language '{0}', expected 'jsonlogic@1.0.0'")]
    UnsupportedLang(String),

    #[error("response queryId does not match the originating query id")]
    QueryIdMismatch,

    #[error("response timestamp is not strictly later than the query timestamp")]
    ResponseNotAfterQuery,

    #[error("proof is malformed: {0}")]
    MalformedProof(String),
}
