//! Cached tool catalog from the last successful `tools/list`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{McpError, Result};
use crate::outcome::RpcOutcome;
use crate::protocol::ToolDescriptor;

/// The set of tools obtained from the last successful `tools/list`.
///
/// The catalog is only ever replaced wholesale. A failed refresh leaves the
/// previous contents in place.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl ToolCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog from a `tools/list` outcome.
    ///
    /// Only a successful outcome touches the catalog. `result.tools` may be
    /// absent (an empty catalog); if present it must be a list. Entries that
    /// are not readable as a descriptor, or repeat an earlier name, are
    /// skipped.
    pub fn apply(&mut self, outcome: &RpcOutcome) -> Result<&[ToolDescriptor]> {
        if !outcome.is_success() {
            return Err(McpError::catalog_refresh(outcome.clone()));
        }

        let tools = match outcome.result().and_then(|r| r.get("tools")) {
            None => Vec::new(),
            Some(Value::Array(entries)) => parse_entries(entries),
            Some(other) => {
                return Err(McpError::MalformedCatalog(format!(
                    "expected result.tools to be a list, got {}",
                    json_kind(other)
                )));
            }
        };

        self.replace(tools);
        Ok(&self.tools)
    }

    /// Replace the whole catalog.
    pub fn replace(&mut self, tools: Vec<ToolDescriptor>) {
        tracing::debug!(
            previous = self.tools.len(),
            current = tools.len(),
            "replacing tool catalog"
        );
        self.tools = tools;
        self.refreshed_at = Some(Utc::now());
    }

    /// Tools in server order.
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Iterate tools in server order.
    pub fn iter(&self) -> std::slice::Iter<'_, ToolDescriptor> {
        self.tools.iter()
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Tool names in server order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// When the catalog was last replaced, if ever.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}

fn parse_entries(entries: &[Value]) -> Vec<ToolDescriptor> {
    let mut seen = HashSet::new();
    let mut tools = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let tool: ToolDescriptor = match serde_json::from_value(entry.clone()) {
            Ok(tool) => tool,
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable tool descriptor");
                continue;
            }
        };
        if !seen.insert(tool.name.clone()) {
            tracing::warn!(index, tool = %tool.name, "skipping duplicate tool name");
            continue;
        }
        tools.push(tool);
    }

    tools
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
