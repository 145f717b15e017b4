//! Dotted-path traversal over the vault's JSON tree.
//!
//! Mirrors `vqp_eval::VarMap::get`'s segment-by-segment walk, but over a
//! borrowed `&Value` rather than a flat map, since the vault is the
//! source of truth the evaluator's variable map is built from.

use serde_json::Value;

/// Resolve a dotted path (`"personal.age"`) against a vault tree.
/// Missing data is `None`, never a fault (`spec.md` §4.4).
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

pub fn has_path(root: &Value, path: &str) -> bool {
    get_path(root, path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_path() {
        let vault = json!({"personal": {"age": 25}});
        assert_eq!(get_path(&vault, "personal.age"), Some(&json!(25)));
    }

    #[test]
    fn missing_path_is_none_not_a_panic() {
        let vault = json!({"personal": {"age": 25}});
        assert_eq!(get_path(&vault, "personal.missing"), None);
        assert_eq!(get_path(&vault, "nonexistent.path"), None);
        assert!(!has_path(&vault, "nonexistent.path"));
    }

    #[test]
    fn top_level_scalar_path() {
        let vault = json!({"flag": true});
        assert_eq!(get_path(&vault, "flag"), Some(&json!(true)));
    }
}
