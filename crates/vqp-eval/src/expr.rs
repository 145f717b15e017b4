//! The predicate AST and its JsonLogic-shaped parser.
//!
//! Per the REDESIGN FLAGS in `spec.md` §9, the wire format's dynamically
//! shaped nested-mapping predicates are parsed exactly once, at ingress,
//! into this tagged [`Expr`] variant. Everything downstream (evaluation,
//! variable extraction, complexity counting) works over the typed tree,
//! never over raw JSON again.

use {crate::error::EvalError, serde_json::Value, std::collections::BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Var(String),
    Literal(Value),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Gte(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Lte(Box<Expr>, Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    In(Box<Expr>, Box<Expr>),
}

/// Parse a JsonLogic-shaped predicate tree into an [`Expr`].
///
/// Recognized operators: `==`, `!=`, `>`, `>=`, `<`, `<=`, `and`, `or`,
/// `not`/`!`, `in`, `var`. Anything else surfaces [`EvalError::
/// UnknownOperator`]; wrong operand counts surface [`EvalError::
/// WrongArity`].
pub fn parse(json: &Value) -> Result<Expr, EvalError> {
    match json {
        Value::Object(map) => {
            if map.len() != 1 {
                return Err(EvalError::NotAnOperatorNode(json.to_string()));
            }
            let (op, args) = map.iter().next().expect("len checked above");
            parse_operator(op, args)
        }
        other => Ok(Expr::Literal(other.clone())),
    }
}

fn as_args(args: &Value) -> Vec<Value> {
    match args {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn parse_operator(op: &str, args: &Value) -> Result<Expr, EvalError> {
    if op == "var" {
        return parse_var(args);
    }

    let items = as_args(args);

    macro_rules! binary {
        ($variant:ident, $name:literal) => {{
            if items.len() != 2 {
                return Err(EvalError::WrongArity {
                    op: $name,
                    expected: "2",
                    got: items.len(),
                });
            }
            let mut it = items.into_iter();
            let a = parse(&it.next().unwrap())?;
            let b = parse(&it.next().unwrap())?;
            Ok(Expr::$variant(Box::new(a), Box::new(b)))
        }};
    }

    match op {
        "==" => binary!(Eq, "=="),
        "!=" => binary!(Ne, "!="),
        ">" => binary!(Gt, ">"),
        ">=" => binary!(Gte, ">="),
        "<" => binary!(Lt, "<"),
        "<=" => binary!(Lte, "<="),
        "in" => binary!(In, "in"),
        "and" => {
            if items.is_empty() {
                return Err(EvalError::WrongArity {
                    op: "and",
                    expected: ">=1",
                    got: 0,
                });
            }
            let parsed = items.iter().map(parse).collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::And(parsed))
        }
        "or" => {
            if items.is_empty() {
                return Err(EvalError::WrongArity {
                    op: "or",
                    expected: ">=1",
                    got: 0,
                });
            }
            let parsed = items.iter().map(parse).collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::Or(parsed))
        }
        "not" | "!" => {
            if items.len() != 1 {
                return Err(EvalError::WrongArity {
                    op: "not",
                    expected: "1",
                    got: items.len(),
                });
            }
            let inner = parse(&items[0])?;
            Ok(Expr::Not(Box::new(inner)))
        }
        other => Err(EvalError::UnknownOperator(other.to_string())),
    }
}

fn parse_var(args: &Value) -> Result<Expr, EvalError> {
    match args {
        Value::String(path) => Ok(Expr::Var(path.clone())),
        // JsonLogic also allows `{"var": ["path", default]}`; we only need
        // the path for variable extraction/evaluation purposes and treat
        // the default as an ordinary literal fallback via `or`.
        Value::Array(items) if !items.is_empty() => match &items[0] {
            Value::String(path) => Ok(Expr::Var(path.clone())),
            other => Err(EvalError::InvalidVarPath(other.to_string())),
        },
        other => Err(EvalError::InvalidVarPath(other.to_string())),
    }
}

/// Every dotted variable path referenced anywhere in the tree.
pub fn extract_variables(expr: &Expr) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    collect_variables(expr, &mut out);
    out
}

fn collect_variables(expr: &Expr, out: &mut BTreeSet<String>) {
    match expr {
        Expr::Var(path) => {
            out.insert(path.clone());
        }
        Expr::Literal(_) => {}
        Expr::Eq(a, b) | Expr::Ne(a, b) | Expr::Gt(a, b) | Expr::Gte(a, b) | Expr::Lt(a, b)
        | Expr::Lte(a, b) | Expr::In(a, b) => {
            collect_variables(a, out);
            collect_variables(b, out);
        }
        Expr::And(items) | Expr::Or(items) => {
            for item in items {
                collect_variables(item, out);
            }
        }
        Expr::Not(inner) => collect_variables(inner, out),
    }
}

/// `true` iff `json` parses into a well-formed [`Expr`].
pub fn is_valid_expression(json: &Value) -> bool {
    parse(json).is_ok()
}

/// Total node count of the tree, used by the engine to enforce a
/// complexity budget (`spec.md` §4.2).
pub fn node_count(expr: &Expr) -> usize {
    1 + match expr {
        Expr::Var(_) | Expr::Literal(_) => 0,
        Expr::Eq(a, b) | Expr::Ne(a, b) | Expr::Gt(a, b) | Expr::Gte(a, b) | Expr::Lt(a, b)
        | Expr::Lte(a, b) | Expr::In(a, b) => node_count(a) + node_count(b),
        Expr::And(items) | Expr::Or(items) => items.iter().map(node_count).sum(),
        Expr::Not(inner) => node_count(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_age_gate() {
        let expr = parse(&json!({">=": [{"var": "age"}, 18]})).unwrap();
        assert_eq!(
            expr,
            Expr::Gte(
                Box::new(Expr::Var("age".into())),
                Box::new(Expr::Literal(json!(18)))
            )
        );
        assert_eq!(extract_variables(&expr), BTreeSet::from(["age".to_string()]));
        assert_eq!(node_count(&expr), 3);
    }

    #[test]
    fn parses_conjunction() {
        let expr = parse(&json!({"and": [
            {">=": [{"var": "annual_income"}, 50000]},
            {"==": [{"var": "employment_status"}, "employed"]}
        ]}))
        .unwrap();
        assert_eq!(
            extract_variables(&expr),
            BTreeSet::from(["annual_income".to_string(), "employment_status".to_string()])
        );
    }

    #[test]
    fn unknown_operator_is_structural_error() {
        let err = parse(&json!({"xor": [true, false]})).unwrap_err();
        assert_eq!(err, EvalError::UnknownOperator("xor".into()));
    }

    #[test]
    fn wrong_arity_is_structural_error() {
        let err = parse(&json!({"==": [1]})).unwrap_err();
        assert_eq!(
            err,
            EvalError::WrongArity {
                op: "==",
                expected: "2",
                got: 1
            }
        );
    }

    #[test]
    fn is_valid_expression_reports_parse_outcome() {
        assert!(is_valid_expression(&json!({"==": [1, 1]})));
        assert!(!is_valid_expression(&json!({"nope": [1, 1]})));
    }

    #[test]
    fn not_accepts_bang_alias() {
        let a = parse(&json!({"not": [true]})).unwrap();
        let b = parse(&json!({"!": [true]})).unwrap();
        assert_eq!(a, b);
    }
}
