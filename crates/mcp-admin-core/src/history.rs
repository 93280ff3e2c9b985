//! Newest-first log of every dispatched call.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::RpcOutcome;
use crate::protocol::RpcRequest;

/// How many entries a front-end shows by default.
///
/// A display policy only; storage keeps everything unless a retention
/// limit is configured.
pub const DISPLAY_WINDOW: usize = 20;

/// One dispatched call and its classified outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the entry was recorded (after the call completed).
    pub timestamp: DateTime<Utc>,
    /// Tool name, or the method for non-tool calls such as `tools/list`.
    pub tool_name: String,
    /// The envelope that was sent.
    pub request: RpcRequest,
    /// How the call ended.
    pub outcome: RpcOutcome,
}

/// Append-only call history, newest first.
#[derive(Debug, Clone, Default)]
pub struct CallHistory {
    entries: VecDeque<HistoryEntry>,
    retention: Option<usize>,
    evicted: u64,
}

impl CallHistory {
    /// Unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// History that keeps at most `max` entries, evicting the oldest.
    ///
    /// Every eviction is logged and counted in [`CallHistory::evicted`].
    pub fn with_retention(max: usize) -> Self {
        Self {
            retention: Some(max.max(1)),
            ..Self::default()
        }
    }

    /// Record a call at the front, stamped with the current time.
    pub fn record(
        &mut self,
        tool_name: impl Into<String>,
        request: RpcRequest,
        outcome: RpcOutcome,
    ) -> &HistoryEntry {
        let entry = HistoryEntry {
            timestamp: Utc::now(),
            tool_name: tool_name.into(),
            request,
            outcome,
        };
        self.entries.push_front(entry);

        if let Some(max) = self.retention {
            while self.entries.len() > max {
                if let Some(old) = self.entries.pop_back() {
                    self.evicted += 1;
                    tracing::debug!(
                        tool = %old.tool_name,
                        id = %old.request.id,
                        retention = max,
                        "evicted oldest history entry"
                    );
                }
            }
        }

        &self.entries[0]
    }

    /// The `n` most recent entries, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().take(n)
    }

    /// Entry by position, 0 being the newest.
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// The newest entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// All stored entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries dropped by the retention limit.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::classify;
    use crate::protocol::EnvelopeBuilder;
    use serde_json::json;

    fn record_call(history: &mut CallHistory, builder: &EnvelopeBuilder, tool: &str) {
        let request = builder.tools_call(tool, json!({}));
        history.record(tool, request, classify(200, r#"{"result": {"ok": true}}"#));
    }

    #[test]
    fn test_recent_is_newest_first() {
        let builder = EnvelopeBuilder::new();
        let mut history = CallHistory::new();
        record_call(&mut history, &builder, "getSystemPrompt");
        record_call(&mut history, &builder, "getKVFlag");
        record_call(&mut history, &builder, "setKVFlag");

        let recent: Vec<&str> = history.recent(2).map(|e| e.tool_name.as_str()).collect();
        assert_eq!(recent, vec!["setKVFlag", "getKVFlag"]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_recent_more_than_stored() {
        let builder = EnvelopeBuilder::new();
        let mut history = CallHistory::new();
        record_call(&mut history, &builder, "a");

        assert_eq!(history.recent(DISPLAY_WINDOW).count(), 1);
        assert_eq!(CallHistory::new().recent(5).count(), 0);
    }

    #[test]
    fn test_unbounded_keeps_beyond_display_window() {
        let builder = EnvelopeBuilder::new();
        let mut history = CallHistory::new();
        for i in 0..(DISPLAY_WINDOW + 5) {
            record_call(&mut history, &builder, &format!("tool{}", i));
        }

        assert_eq!(history.len(), DISPLAY_WINDOW + 5);
        assert_eq!(history.recent(DISPLAY_WINDOW).count(), DISPLAY_WINDOW);
        assert_eq!(history.get(DISPLAY_WINDOW + 4).unwrap().tool_name, "tool0");
        assert_eq!(history.evicted(), 0);
    }

    #[test]
    fn test_retention_evicts_oldest_and_counts() {
        let builder = EnvelopeBuilder::new();
        let mut history = CallHistory::with_retention(2);
        record_call(&mut history, &builder, "first");
        record_call(&mut history, &builder, "second");
        record_call(&mut history, &builder, "third");

        let names: Vec<&str> = history.iter().map(|e| e.tool_name.as_str()).collect();
        assert_eq!(names, vec!["third", "second"]);
        assert_eq!(history.evicted(), 1);
    }

    #[test]
    fn test_timestamps_are_non_decreasing_toward_front() {
        let builder = EnvelopeBuilder::new();
        let mut history = CallHistory::new();
        record_call(&mut history, &builder, "a");
        record_call(&mut history, &builder, "b");

        let newest = history.get(0).unwrap();
        let older = history.get(1).unwrap();
        assert!(newest.timestamp >= older.timestamp);
        assert_eq!(history.latest().unwrap().tool_name, "b");
    }

    #[test]
    fn test_entry_serializes_for_display() {
        let builder = EnvelopeBuilder::new();
        let mut history = CallHistory::new();
        let entry = history.record(
            "aiChat",
            builder.tools_call("aiChat", json!({"prompt": "hello"})),
            RpcOutcome::transport_failure("timed out"),
        );

        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["tool_name"], "aiChat");
        assert_eq!(value["request"]["params"]["arguments"]["prompt"], "hello");
        assert_eq!(value["outcome"]["classification"], "transport_failure");
    }
}
