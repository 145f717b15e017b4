//! Append-only audit entries emitted on terminal query outcomes
//! (`spec.md` §3 "Audit Entry", §5 ordering guarantees: entries are
//! appended in the order of terminal transitions).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    QueryReceived,
    QueryProcessed,
    ErrorOccurred,
    KeyRotated,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub query_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub querier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<Value>,
}

impl AuditEntry {
    pub fn query_received(query_id: Uuid, querier: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event: AuditEvent::QueryReceived,
            query_id: Some(query_id),
            querier: Some(querier.into()),
            result: None,
            error: None,
            metadata: None,
        }
    }

    pub fn query_processed(query_id: Uuid, querier: impl Into<String>, result: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            event: AuditEvent::QueryProcessed,
            query_id: Some(query_id),
            querier: Some(querier.into()),
            result: Some(result),
            error: None,
            metadata: None,
        }
    }

    pub fn error_occurred(query_id: Option<Uuid>, error: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event: AuditEvent::ErrorOccurred,
            query_id,
            querier: None,
            result: None,
            error: Some(error.into()),
            metadata: None,
        }
    }

    pub fn key_rotated(key_id: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event: AuditEvent::KeyRotated,
            query_id: None,
            querier: None,
            result: None,
            error: None,
            metadata: Some(Value::String(key_id.into())),
        }
    }
}

/// Suspension point accepting one audit entry at a time. Per `spec.md`
/// §7: "failures of the audit port are logged to a secondary channel but
/// do not mask the original fault" — `record` therefore reports its own
/// failure rather than propagating it into the engine's result type.
pub trait AuditPort: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), String>;
}

/// Writes every entry to the `log` facade at `info` level — the simplest
/// collaborator that satisfies the port without requiring a real sink,
/// used by the CLI and as a test default.
pub struct LoggingAuditSink;

impl AuditPort for LoggingAuditSink {
    fn record(&self, entry: AuditEntry) -> Result<(), String> {
        log::info!(
            "audit: {}",
            serde_json::to_string(&entry).unwrap_or_else(|e| format!("<unserializable: {e}>"))
        );
        Ok(())
    }
}

/// Appends every entry to an in-memory vector, for tests that assert on
/// audit trail shape.
#[derive(Default)]
pub struct RecordingAuditSink(std::sync::Mutex<Vec<AuditEntry>>);

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.0.lock().expect("audit sink lock poisoned").clone()
    }
}

/// Lets an `Arc`-shared sink (e.g. a [`RecordingAuditSink`] a test wants
/// to inspect after the fact) be handed to a `Responder` as a
/// `Box<dyn AuditPort>`.
impl<T: AuditPort + ?Sized> AuditPort for std::sync::Arc<T> {
    fn record(&self, entry: AuditEntry) -> Result<(), String> {
        (**self).record(entry)
    }
}

impl AuditPort for RecordingAuditSink {
    fn record(&self, entry: AuditEntry) -> Result<(), String> {
        self.0.lock().expect("audit sink lock poisoned").push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_preserves_append_order() {
        let sink = RecordingAuditSink::new();
        sink.record(AuditEntry::query_received(Uuid::nil(), "did:example:1"))
            .unwrap();
        sink.record(AuditEntry::query_processed(
            Uuid::nil(),
            "did:example:1",
            Value::Bool(true),
        ))
        .unwrap();
        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event, AuditEvent::QueryReceived);
        assert_eq!(entries[1].event, AuditEvent::QueryProcessed);
    }
}
