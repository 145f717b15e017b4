use thiserror::Error;

/// Structural malformation detected while parsing a predicate tree.
///
/// Per `spec.md` §4.2, this is the *only* way evaluation fails: a
/// syntactically well-formed predicate always produces a result, never an
/// error, no matter what data it is evaluated against.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("operator '{op}' expects {expected} operand(s), got {got}")]
    WrongArity {
        op: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("'var' expects a string path, got: {0}")]
    InvalidVarPath(String),

    #[error("expected a JSON object describing an operator, found: {0}")]
    NotAnOperatorNode(String),

    #[error("predicate tree has {actual} nodes, exceeding the configured budget of {budget}")]
    ComplexityExceeded { actual: usize, budget: usize },
}
