//! Activity log entries for committed rank changes

use super::ids::{CategoryId, LogEntryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A log entry recording a committed reorder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique ID for this log entry
    pub id: LogEntryId,

    /// When the change was committed
    pub timestamp: DateTime<Utc>,

    /// Canonical op string (e.g., "reorder categories")
    pub op: String,

    /// Sibling groups whose ranks were rewritten
    pub groups: Vec<CategoryId>,

    /// The submitted payload
    pub input: Value,

    /// The committed outcome
    pub output: Value,

    /// Who submitted the change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// How long validation and commit took
    pub duration_ms: u64,
}

impl LogEntry {
    /// Create a new log entry
    pub fn new(
        op: impl Into<String>,
        groups: Vec<CategoryId>,
        input: Value,
        output: Value,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: LogEntryId::new(),
            timestamp: Utc::now(),
            op: op.into(),
            groups,
            input,
            output,
            actor: None,
            duration_ms,
        }
    }

    /// Set the actor
    pub fn with_actor(mut self, actor: Option<impl Into<String>>) -> Self {
        self.actor = actor.map(Into::into);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_creation() {
        let entry = LogEntry::new(
            "reorder categories",
            vec![CategoryId::new(1)],
            serde_json::json!({"entries": []}),
            serde_json::json!({"updated": 3}),
            12,
        );

        assert_eq!(entry.op, "reorder categories");
        assert_eq!(entry.groups, vec![CategoryId::new(1)]);
        assert_eq!(entry.duration_ms, 12);
        assert!(entry.actor.is_none());
    }

    #[test]
    fn test_log_entry_with_actor() {
        let entry = LogEntry::new("move category", vec![], Value::Null, Value::Null, 1)
            .with_actor(Some("admin[42]"));
        assert_eq!(entry.actor.as_deref(), Some("admin[42]"));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["actor"], "admin[42]");
    }

    #[test]
    fn test_actor_omitted_when_absent() {
        let entry = LogEntry::new("move category", vec![], Value::Null, Value::Null, 1)
            .with_actor(None::<String>);
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("actor").is_none());
    }
}
