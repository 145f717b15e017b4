use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VocabError {
    #[error("vocabulary '{0}' is not known to this responder")]
    NotFound(String),

    #[error("vocabulary '{0}' is not in the allow-list")]
    NotAuthorized(String),

    #[error("vocabulary document for '{uri}' is not a valid Draft 2020-12 schema: {reason}")]
    InvalidSchema { uri: String, reason: String },

    #[error("field '{field}' is not declared by vocabulary '{vocab}'")]
    UnknownField { field: String, vocab: String },
}
