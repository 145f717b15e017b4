//! The canonical, byte-exact payload covered by a response's signature.
//!
//! `spec.md` §4.1 pins the payload to `{queryId, result, timestamp,
//! responder}` with keys in that order, compact separators, and stable
//! numeric formatting; §4.6 extends it to include `value` whenever the
//! disclosure mode produced one. Any whitespace or field-order change must
//! invalidate the signature, so this module is the *only* place allowed to
//! produce the bytes that get signed or verified — callers never hand-roll
//! JSON for this purpose.

use {
    chrono::{DateTime, Utc},
    serde::Serialize,
    serde_json::Value,
    uuid::Uuid,
};

/// The exact shape signed over. Field declaration order is load-bearing:
/// `serde_json` serializes struct fields in declaration order (unlike a
/// `serde_json::Map`, which would need the `preserve_order` feature), so
/// this struct alone fixes the wire order without extra ceremony.
#[derive(Serialize)]
struct CanonicalPayload<'a> {
    #[serde(rename = "queryId")]
    query_id: Uuid,
    result: &'a Value,
    timestamp: DateTime<Utc>,
    responder: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a Value>,
}

/// Produce the canonical byte sequence for signing/verification.
///
/// `value` MUST be `None` for strict-mode responses and `Some` whenever a
/// disclosure mode surfaced an underlying value, matching the pinned
/// protocol-version decision in `spec.md` §9 (DESIGN NOTES, open
/// questions).
pub fn canonical_payload_bytes(
    query_id: Uuid,
    result: &Value,
    timestamp: DateTime<Utc>,
    responder: &str,
    value: Option<&Value>,
) -> Vec<u8> {
    let payload = CanonicalPayload {
        query_id,
        result,
        timestamp,
        responder,
        value,
    };
    // `to_vec` on a struct never fails for our field types.
    serde_json::to_vec(&payload).expect("canonical payload is always serializable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn field_order_is_fixed() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let id = Uuid::nil();
        let bytes = canonical_payload_bytes(id, &Value::Bool(true), ts, "responder-1", None);
        let s = String::from_utf8(bytes).unwrap();
        assert_eq!(
            s,
            format!(
                "{{\"queryId\":\"{id}\",\"result\":true,\"timestamp\":\"{}\",\"responder\":\"responder-1\"}}",
                ts.to_rfc3339()
            )
        );
    }

    #[test]
    fn value_extends_payload_when_present() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let id = Uuid::nil();
        let value = Value::from(42);
        let bytes = canonical_payload_bytes(id, &Value::Bool(true), ts, "r1", Some(&value));
        let s = String::from_utf8(bytes).unwrap();
        assert!(s.ends_with("\"value\":42}"));
    }

    #[test]
    fn any_mutation_changes_the_bytes() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let id = Uuid::nil();
        let a = canonical_payload_bytes(id, &Value::Bool(true), ts, "r1", None);
        let b = canonical_payload_bytes(id, &Value::Bool(false), ts, "r1", None);
        assert_ne!(a, b);
    }
}
