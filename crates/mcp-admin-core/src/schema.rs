//! Placeholder arguments synthesized from a tool's input schema.
//!
//! This is a scaffold for the argument editor, not validation. Any schema
//! is accepted; whatever cannot be interpreted becomes `null`.

use serde_json::{Map, Value};

use crate::error::{McpError, Result};

/// The declared type of one schema property, as far as defaulting cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Array,
    /// Objects, `integer`, union types, or no type at all.
    Unknown,
}

impl PropertyKind {
    /// Resolve the kind of a property schema from its `type` field.
    ///
    /// Only a single type name is interpreted. A list of types (a union) is
    /// `Unknown` rather than a guess at one member.
    pub fn of(property: &Value) -> Self {
        match property.get("type").and_then(Value::as_str) {
            Some("string") => PropertyKind::String,
            Some("number") => PropertyKind::Number,
            Some("boolean") => PropertyKind::Boolean,
            Some("array") => PropertyKind::Array,
            _ => PropertyKind::Unknown,
        }
    }

    /// The placeholder value for this kind.
    pub fn placeholder(self) -> Value {
        match self {
            PropertyKind::String => Value::String(String::new()),
            PropertyKind::Number => Value::from(0),
            PropertyKind::Boolean => Value::Bool(false),
            PropertyKind::Array => Value::Array(Vec::new()),
            PropertyKind::Unknown => Value::Null,
        }
    }
}

/// Map each declared property to a placeholder, in declaration order.
///
/// A schema without an object-valued `properties` yields an empty map.
pub fn synthesize(input_schema: &Value) -> Map<String, Value> {
    let Some(properties) = input_schema.get("properties").and_then(Value::as_object) else {
        return Map::new();
    };

    properties
        .iter()
        .map(|(name, property)| (name.clone(), PropertyKind::of(property).placeholder()))
        .collect()
}

/// Pretty-printed placeholder object for the argument editor.
pub fn render_defaults(input_schema: &Value) -> String {
    let defaults = Value::Object(synthesize(input_schema));
    // A Value built from a Map always serializes.
    serde_json::to_string_pretty(&defaults).unwrap_or_else(|_| "{}".to_string())
}

/// Parse operator-edited argument text.
///
/// Blank text means no arguments (`{}`). Anything else must be a JSON
/// object, since it is sent as `params.arguments`.
pub fn parse_arguments(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value =
        serde_json::from_str(text).map_err(|e| McpError::malformed_input(e.to_string()))?;

    if !value.is_object() {
        return Err(McpError::malformed_input(
            "arguments must be a JSON object",
        ));
    }

    Ok(value)
}
