//! Saved tool calls.
//!
//! A preset names a tool and a starting set of arguments. Nothing here knows
//! what any tool does; the rules a preset carries are generic:
//!
//! ```yaml
//! presets:
//!   - name: kv-get
//!     tool: getKVFlag
//!     args: { key: SYSTEM_PROMPT }
//!     required: [key]
//!
//!   - name: ai-chat
//!     tool: aiChat
//!     args: { prompt: "", model: "" }
//!     required: [prompt]
//!     optional: [model]
//!     suggestions:
//!       model: ["@cf/meta/llama-2-7b-chat-fp16", "openai/gpt-4o-mini"]
//!
//!   - name: deploy-worker
//!     tool: createWorkerFromCode
//!     args: { script_name: "", script_code: "", dryRun: true, confirm: false }
//!     required: [script_name, script_code]
//!     confirm:
//!       when: dryRun
//!       equals: false
//!       flag: confirm
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ConfigError, Result};

/// A saved tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Preset {
    /// Unique name used to invoke the preset.
    pub name: String,

    /// One-line description for listings.
    #[serde(default)]
    pub description: String,

    /// Tool to call.
    pub tool: String,

    /// Starting arguments.
    #[serde(default)]
    pub args: Map<String, Value>,

    /// Arguments that must not be blank when the call is sent.
    #[serde(default)]
    pub required: Vec<String>,

    /// Arguments left out of the call when blank.
    #[serde(default)]
    pub optional: Vec<String>,

    /// Suggested values per argument. Informational only.
    #[serde(default)]
    pub suggestions: BTreeMap<String, Vec<String>>,

    /// Confirmation rule for calls that take effect.
    #[serde(default)]
    pub confirm: Option<ConfirmGuard>,
}

/// Blocks a call unless a boolean flag argument is set.
///
/// The guard applies when argument `when` equals `equals`; the call is then
/// only sent if argument `flag` is `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfirmGuard {
    pub when: String,
    pub equals: Value,
    pub flag: String,
}

impl ConfirmGuard {
    /// Whether `args` trip the guard without the flag set.
    pub fn blocks(&self, args: &Map<String, Value>) -> bool {
        args.get(&self.when) == Some(&self.equals) && args.get(&self.flag) != Some(&Value::Bool(true))
    }
}

impl Preset {
    /// Create a preset with no rules.
    pub fn new(name: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tool: tool.into(),
            args: Map::new(),
            required: Vec::new(),
            optional: Vec::new(),
            suggestions: BTreeMap::new(),
            confirm: None,
        }
    }

    /// Set a starting argument.
    pub fn with_arg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.args.insert(key.into(), value);
        self
    }

    /// Mark an argument as required.
    pub fn with_required(mut self, key: impl Into<String>) -> Self {
        self.required.push(key.into());
        self
    }

    /// Mark an argument as dropped when blank.
    pub fn with_optional(mut self, key: impl Into<String>) -> Self {
        self.optional.push(key.into());
        self
    }

    /// Set the confirmation rule.
    pub fn with_confirm(mut self, guard: ConfirmGuard) -> Self {
        self.confirm = Some(guard);
        self
    }

    /// Starting arguments with overrides applied, before any rule is checked.
    pub fn arguments(&self, overrides: &[(String, Value)]) -> Map<String, Value> {
        let mut args = self.args.clone();
        for (key, value) in overrides {
            args.insert(key.clone(), value.clone());
        }
        args
    }

    /// Apply the preset's rules to edited arguments.
    ///
    /// `confirmed` sets the guard's flag to `true`. Blank optional arguments
    /// are removed, then required arguments and the guard are checked.
    pub fn finalize(&self, mut args: Map<String, Value>, confirmed: bool) -> Result<Map<String, Value>> {
        if confirmed && let Some(guard) = &self.confirm {
            args.insert(guard.flag.clone(), Value::Bool(true));
        }

        for key in &self.optional {
            if args.get(key).is_some_and(is_blank) {
                args.remove(key);
            }
        }

        for key in &self.required {
            if args.get(key).is_none_or(is_blank) {
                return Err(ConfigError::PresetArgumentMissing {
                    preset: self.name.clone(),
                    argument: key.clone(),
                });
            }
        }

        if let Some(guard) = &self.confirm
            && guard.blocks(&args)
        {
            return Err(ConfigError::ConfirmationRequired {
                preset: self.name.clone(),
                when: guard.when.clone(),
                equals: guard.equals.to_string(),
                flag: guard.flag.clone(),
            });
        }

        Ok(args)
    }

    /// Overrides, then rules: the arguments to send.
    pub fn resolve(&self, overrides: &[(String, Value)], confirmed: bool) -> Result<Map<String, Value>> {
        self.finalize(self.arguments(overrides), confirmed)
    }
}

/// Null, or a string with nothing but whitespace.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Parse a `key=value` override.
///
/// The value is read as JSON when it parses (`true`, `3`, `"x"`, `{...}`),
/// otherwise it is taken as a plain string. `key=` gives an empty string.
pub fn parse_override(text: &str) -> Result<(String, Value)> {
    let (key, raw) = text
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(format!("'{}' is not KEY=VALUE", text)))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::InvalidOverride(format!("'{}' has an empty key", text)));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
