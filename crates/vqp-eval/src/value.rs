use {serde_json::Value, std::collections::HashMap};

/// A resolved variable that may or may not exist.
///
/// The evaluator never faults on a missing variable — it treats it as
/// [`EvalValue::Undefined`] and lets each operator decide its own neutral
/// falsey result, per `spec.md` §4.2 point 1. This is how "the data simply
/// isn't there" is kept distinguishable from a structural evaluation fault.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    Undefined,
    Defined(Value),
}

impl EvalValue {
    pub fn defined(value: Value) -> Self {
        EvalValue::Defined(value)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, EvalValue::Undefined)
    }

    /// JsonLogic-style truthiness: `false`/`null`/`0`/`""`/`[]`/undefined
    /// are falsey, everything else is truthy.
    pub fn as_bool(&self) -> bool {
        match self {
            EvalValue::Undefined => false,
            EvalValue::Defined(Value::Null) => false,
            EvalValue::Defined(Value::Bool(b)) => *b,
            EvalValue::Defined(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            EvalValue::Defined(Value::String(s)) => !s.is_empty(),
            EvalValue::Defined(Value::Array(a)) => !a.is_empty(),
            EvalValue::Defined(Value::Object(o)) => !o.is_empty(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EvalValue::Defined(Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            EvalValue::Defined(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            EvalValue::Defined(Value::Array(a)) => Some(a),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            EvalValue::Undefined => Value::Null,
            EvalValue::Defined(v) => v,
        }
    }
}

impl From<Value> for EvalValue {
    fn from(value: Value) -> Self {
        EvalValue::Defined(value)
    }
}

/// The flat (but dotted-path-aware) variable environment a predicate is
/// evaluated against, per `spec.md` §4.2: "a flat mapping `{field →
/// scalar | array}`".
///
/// Lookup first tries the path as a literal key (covering vaults/vocab
/// mappings that expose already-dotted field names such as
/// `"financial.annual_income"`), then falls back to segment-by-segment
/// traversal through nested JSON objects so a caller that instead handed
/// over a genuinely nested structure still works.
#[derive(Debug, Clone, Default)]
pub struct VarMap(HashMap<String, Value>);

impl VarMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, path: impl Into<String>, value: Value) {
        self.0.insert(path.into(), value);
    }

    pub fn get(&self, path: &str) -> EvalValue {
        if let Some(v) = self.0.get(path) {
            return EvalValue::Defined(v.clone());
        }

        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return EvalValue::Undefined;
        };
        let Some(mut current) = self.0.get(first) else {
            return EvalValue::Undefined;
        };
        for segment in segments {
            match current.get(segment) {
                Some(next) => current = next,
                None => return EvalValue::Undefined,
            }
        }
        EvalValue::Defined(current.clone())
    }
}

impl From<HashMap<String, Value>> for VarMap {
    fn from(map: HashMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for VarMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_dotted_key_wins_over_traversal() {
        let mut vars = VarMap::new();
        vars.insert("financial.annual_income", Value::from(75000));
        assert_eq!(
            vars.get("financial.annual_income").as_f64(),
            Some(75000.0)
        );
    }

    #[test]
    fn nested_object_traversal_fallback() {
        let mut vars = VarMap::new();
        vars.insert(
            "personal",
            serde_json::json!({"age": 25, "address": {"city": "NYC"}}),
        );
        assert_eq!(vars.get("personal.age").as_f64(), Some(25.0));
        assert_eq!(vars.get("personal.address.city").as_str(), Some("NYC"));
    }

    #[test]
    fn missing_path_is_undefined_not_a_fault() {
        let vars = VarMap::new();
        assert!(vars.get("nonexistent").is_undefined());
        assert!(!vars.get("nonexistent").as_bool());
    }
}
