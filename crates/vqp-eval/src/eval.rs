//! Total evaluation of an [`Expr`] against a [`VarMap`].
//!
//! `evaluate` never panics and never returns an error: a structurally
//! valid predicate tree always produces *some* JSON value, even when
//! every variable it touches is undefined. Structural faults are caught
//! earlier, at [`crate::expr::parse`] time.

use crate::{
    expr::Expr,
    value::{EvalValue, VarMap},
};
use serde_json::Value;

/// Evaluate `expr` against `vars`, returning the raw JSON result.
///
/// Boolean operators resolve to `Value::Bool`; `var`/literal leaves pass
/// their resolved value through unchanged (with undefined variables
/// surfacing as `Value::Null`, matching the JsonLogic convention).
pub fn evaluate(expr: &Expr, vars: &VarMap) -> Value {
    eval_inner(expr, vars).into_value()
}

fn eval_inner(expr: &Expr, vars: &VarMap) -> EvalValue {
    match expr {
        Expr::Var(path) => vars.get(path),
        Expr::Literal(v) => EvalValue::defined(v.clone()),
        Expr::Eq(a, b) => EvalValue::defined(Value::Bool(values_equal(
            &eval_inner(a, vars),
            &eval_inner(b, vars),
        ))),
        Expr::Ne(a, b) => EvalValue::defined(Value::Bool(!values_equal(
            &eval_inner(a, vars),
            &eval_inner(b, vars),
        ))),
        Expr::Gt(a, b) => EvalValue::defined(Value::Bool(compare(a, b, vars, |x, y| x > y))),
        Expr::Gte(a, b) => EvalValue::defined(Value::Bool(compare(a, b, vars, |x, y| x >= y))),
        Expr::Lt(a, b) => EvalValue::defined(Value::Bool(compare(a, b, vars, |x, y| x < y))),
        Expr::Lte(a, b) => EvalValue::defined(Value::Bool(compare(a, b, vars, |x, y| x <= y))),
        Expr::And(items) => {
            EvalValue::defined(Value::Bool(items.iter().all(|e| eval_inner(e, vars).as_bool())))
        }
        Expr::Or(items) => {
            EvalValue::defined(Value::Bool(items.iter().any(|e| eval_inner(e, vars).as_bool())))
        }
        Expr::Not(inner) => EvalValue::defined(Value::Bool(!eval_inner(inner, vars).as_bool())),
        Expr::In(needle, haystack) => {
            let needle = eval_inner(needle, vars);
            let haystack = eval_inner(haystack, vars);
            EvalValue::defined(Value::Bool(is_in(&needle, &haystack)))
        }
    }
}

/// Numeric comparison with undefined-falsey semantics: if either side
/// isn't a number, the comparison is simply `false`, never an error.
fn compare(a: &Expr, b: &Expr, vars: &VarMap, op: impl Fn(f64, f64) -> bool) -> bool {
    let a = eval_inner(a, vars);
    let b = eval_inner(b, vars);
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => op(x, y),
        _ => false,
    }
}

fn values_equal(a: &EvalValue, b: &EvalValue) -> bool {
    match (a, b) {
        (EvalValue::Undefined, EvalValue::Undefined) => true,
        (EvalValue::Undefined, _) | (_, EvalValue::Undefined) => false,
        (EvalValue::Defined(x), EvalValue::Defined(y)) => x == y,
    }
}

/// `in` membership: string-in-string substring check, or scalar-in-array
/// containment. Any other shape (including undefined operands) is false.
fn is_in(needle: &EvalValue, haystack: &EvalValue) -> bool {
    if let (Some(n), Some(h)) = (needle.as_str(), haystack.as_str()) {
        return h.contains(n);
    }
    if let Some(items) = haystack.as_array() {
        let needle_value = match needle {
            EvalValue::Defined(v) => v.clone(),
            EvalValue::Undefined => return false,
        };
        return items.iter().any(|item| *item == needle_value);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;
    use serde_json::json;

    fn vars(pairs: &[(&str, Value)]) -> VarMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn age_gate_true_and_false() {
        let expr = parse(&json!({">=": [{"var": "age"}, 18]})).unwrap();
        assert_eq!(evaluate(&expr, &vars(&[("age", json!(21))])), json!(true));
        assert_eq!(evaluate(&expr, &vars(&[("age", json!(16))])), json!(false));
    }

    #[test]
    fn income_and_employment_conjunction() {
        let expr = parse(&json!({"and": [
            {">=": [{"var": "annual_income"}, 50000]},
            {"==": [{"var": "employment_status"}, "employed"]}
        ]}))
        .unwrap();
        let ok = vars(&[
            ("annual_income", json!(60000)),
            ("employment_status", json!("employed")),
        ]);
        assert_eq!(evaluate(&expr, &ok), json!(true));

        let underpaid = vars(&[
            ("annual_income", json!(40000)),
            ("employment_status", json!("employed")),
        ]);
        assert_eq!(evaluate(&expr, &underpaid), json!(false));
    }

    #[test]
    fn vaccination_membership_via_in() {
        let expr = parse(&json!({"in": ["covid19", {"var": "vaccinations"}]})).unwrap();
        let has_it = vars(&[("vaccinations", json!(["covid19", "flu"]))]);
        assert_eq!(evaluate(&expr, &has_it), json!(true));

        let missing_it = vars(&[("vaccinations", json!(["flu"]))]);
        assert_eq!(evaluate(&expr, &missing_it), json!(false));
    }

    #[test]
    fn unknown_variable_is_falsey_not_a_fault() {
        let expr = parse(&json!({"==": [{"var": "nonexistent_field"}, "anything"]})).unwrap();
        assert_eq!(evaluate(&expr, &VarMap::new()), json!(false));

        let gate = parse(&json!({">=": [{"var": "nonexistent_field"}, 18]})).unwrap();
        assert_eq!(evaluate(&gate, &VarMap::new()), json!(false));
    }

    #[test]
    fn not_and_or_compose() {
        let expr = parse(&json!({"or": [
            {"not": [{"==": [{"var": "x"}, 1]}]},
            {"==": [{"var": "y"}, 2]}
        ]}))
        .unwrap();
        assert_eq!(evaluate(&expr, &vars(&[("x", json!(1)), ("y", json!(2))])), json!(true));
        assert_eq!(evaluate(&expr, &vars(&[("x", json!(1)), ("y", json!(3))])), json!(false));
    }

    #[test]
    fn literal_passthrough() {
        let expr = parse(&json!(true)).unwrap();
        assert_eq!(evaluate(&expr, &VarMap::new()), json!(true));
    }
}
