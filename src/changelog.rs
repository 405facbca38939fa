//! Append-only audit log of catalog mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The mutations a catalog records. Serialized names match the wire format
/// consumed by the server-side save task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeAction {
    #[serde(rename = "add_src")]
    AddSrc,
    #[serde(rename = "delete_src")]
    DeleteSrc,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::AddSrc => "add_src",
            ChangeAction::DeleteSrc => "delete_src",
        }
    }
}

/// One logged mutation. `info` carries the schema-projected record for adds
/// and the full removed record for deletes, so replaying the log rebuilds
/// the store exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub action: ChangeAction,
    pub info: Value,
    #[serde(default = "Utc::now")]
    pub at: DateTime<Utc>,
}

/// An append-only sequence of [`ChangeEntry`] values. This is an audit
/// trail, not an undo stack: entries are never mutated or removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeLog {
    entries: Vec<ChangeEntry>,
}

impl ChangeLog {
    pub fn new() -> Self {
        ChangeLog::default()
    }

    pub fn push(&mut self, action: ChangeAction, info: Value) {
        self.entries.push(ChangeEntry {
            action,
            info,
            at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild a log from previously saved entries.
    pub fn from_entries(entries: Vec<ChangeEntry>) -> Self {
        ChangeLog { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entries_keep_append_order() {
        let mut log = ChangeLog::new();
        log.push(ChangeAction::AddSrc, json!({"id": "a"}));
        log.push(ChangeAction::DeleteSrc, json!({"id": "a"}));
        log.push(ChangeAction::AddSrc, json!({"id": "b"}));

        let actions: Vec<&str> = log.entries().iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["add_src", "delete_src", "add_src"]);
    }

    #[test]
    fn test_serialized_shape() {
        let mut log = ChangeLog::new();
        log.push(ChangeAction::AddSrc, json!({"id": "a", "ra": 1.0}));

        let json = serde_json::to_value(log.entries()).unwrap();
        assert_eq!(json[0]["action"], "add_src");
        assert_eq!(json[0]["info"]["id"], "a");
    }

    #[test]
    fn test_round_trips_through_json() {
        let mut log = ChangeLog::new();
        log.push(ChangeAction::AddSrc, json!({"id": "a"}));
        log.push(ChangeAction::DeleteSrc, json!({"id": "a"}));

        let text = serde_json::to_string(&log).unwrap();
        let back: ChangeLog = serde_json::from_str(&text).unwrap();
        assert_eq!(back.entries(), log.entries());
    }
}
