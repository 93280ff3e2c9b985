//! Terminal rendering shared by the one-shot commands and the REPL.

use console::{Style, style};
use indicatif::{ProgressBar, ProgressStyle};
use mcp_admin_config::Preset;
use mcp_admin_core::{Classification, HistoryEntry, RpcOutcome, ToolDescriptor};
use serde_json::Value;

/// Pretty-print JSON, falling back to compact form.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn print_dim(msg: &str) {
    let dim = Style::new().dim();
    println!("{}", dim.apply_to(msg));
}

pub fn print_error(msg: &str) {
    let red = Style::new().red();
    println!("{} {}", red.apply_to("Error:"), msg);
}

/// Status marker for an outcome.
fn indicator(classification: Classification) -> String {
    match classification {
        Classification::Success => style("✓").green().to_string(),
        Classification::ProtocolError => style("✗").red().to_string(),
        Classification::TransportFailure => style("✗").red().bold().to_string(),
    }
}

/// Render a call outcome: indicator, summary, and the full body.
pub fn print_outcome(tool: &str, outcome: &RpcOutcome) {
    let headline = if outcome.is_success() {
        format!("Call '{}' succeeded", tool)
    } else {
        format!("Call '{}' failed: {}", tool, outcome.summary())
    };
    println!("{} {}", indicator(outcome.classification), headline);
    println!("{}", pretty(&outcome.body));
}

/// Spinner shown while a call is in flight; hidden when not on a terminal.
pub fn spinner(message: String) -> ProgressBar {
    if !console::Term::stdout().is_term() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}

/// List tools with wrapped descriptions, optionally with their schemas.
pub fn print_tools(tools: &[ToolDescriptor], full: bool) {
    if tools.is_empty() {
        println!("No tools available.");
        return;
    }

    println!("Available tools ({}):", tools.len());
    for tool in tools {
        println!("  • {}", style(&tool.name).cyan());
        if !tool.description.is_empty() {
            for line in textwrap_simple(&tool.description, 70).lines() {
                println!("      {}", line);
            }
        }
        if full {
            println!("      Schema: {}", tool.input_schema);
        }
    }
}

/// One line per entry, newest first, numbered for `/show`.
pub fn print_history<'a>(entries: impl Iterator<Item = &'a HistoryEntry>, total: usize) {
    let dim = Style::new().dim();
    let mut shown = 0;

    for (index, entry) in entries.enumerate() {
        let status = entry
            .outcome
            .status_code
            .map(|s| format!("HTTP {}", s))
            .unwrap_or_else(|| "no response".to_string());
        println!(
            "{:>3}  {} {}  {:<24} {:<12} {}",
            index,
            indicator(entry.outcome.classification),
            dim.apply_to(entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC")),
            truncate(&entry.tool_name, 24),
            status,
            dim.apply_to(arguments_preview(entry, 40))
        );
        shown += 1;
    }

    if shown == 0 {
        print_dim("No history yet - list tools or call one first.");
    } else if total > shown {
        print_dim(&format!("({} of {} entries shown)", shown, total));
    }
}

/// Compact arguments of a `tools/call` entry; empty for other methods.
pub fn arguments_preview(entry: &HistoryEntry, max_len: usize) -> String {
    entry
        .request
        .call_params()
        .map(|params| truncate(&params.arguments.to_string(), max_len))
        .unwrap_or_default()
}

/// Saved tool calls with their starting arguments and rules.
pub fn print_presets(presets: &[Preset]) {
    let dim = Style::new().dim();
    println!("Presets ({}):", presets.len());
    for preset in presets {
        println!(
            "  • {} {}",
            style(&preset.name).cyan(),
            dim.apply_to(format!("-> {}", preset.tool))
        );
        if !preset.description.is_empty() {
            println!("      {}", preset.description);
        }
        println!("      args: {}", Value::Object(preset.args.clone()));
        if !preset.required.is_empty() {
            println!("      required: {}", preset.required.join(", "));
        }
        if !preset.optional.is_empty() {
            println!("      optional: {}", preset.optional.join(", "));
        }
        for (key, values) in &preset.suggestions {
            println!("      {} e.g. {}", key, values.join(", "));
        }
        if let Some(guard) = &preset.confirm {
            println!(
                "      {}",
                style(format!(
                    "needs {}=true when {}={}",
                    guard.flag, guard.when, guard.equals
                ))
                .yellow()
            );
        }
    }
}

/// Full request and response of one history entry.
pub fn print_history_entry(index: usize, entry: &HistoryEntry) {
    let status = entry
        .outcome
        .status_code
        .map(|s| format!("HTTP {}", s))
        .unwrap_or_else(|| "no response".to_string());
    println!(
        "{} #{} {} - {} ({})",
        indicator(entry.outcome.classification),
        index,
        entry.timestamp.to_rfc3339(),
        entry.tool_name,
        status
    );
    println!("{}", style("Request").bold());
    match serde_json::to_value(&entry.request) {
        Ok(request) => println!("{}", pretty(&request)),
        Err(e) => print_error(&format!("cannot render request: {}", e)),
    }
    println!("{}", style("Response").bold());
    println!("{}", pretty(&entry.outcome.body));
}

/// Simple text wrapping helper.
pub fn textwrap_simple(text: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            result.push_str(&current_line);
            result.push('\n');
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        result.push_str(&current_line);
    }

    result
}

/// Truncate a string to a maximum number of characters.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textwrap_simple() {
        let wrapped = textwrap_simple("one two three four", 9);
        assert_eq!(wrapped, "one two\nthree\nfour");
        assert_eq!(textwrap_simple("", 10), "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("createWorkerFromCode", 10), "createW...");
        assert_eq!(truncate("żółwżółwżółw", 6), "żół...");
    }

    #[test]
    fn test_arguments_preview() {
        use mcp_admin_core::{CallHistory, EnvelopeBuilder};

        let envelopes = EnvelopeBuilder::new();
        let mut history = CallHistory::new();
        history.record(
            "getKVFlag",
            envelopes.tools_call("getKVFlag", serde_json::json!({"key": "SYSTEM_PROMPT"})),
            RpcOutcome::transport_failure("refused"),
        );
        history.record(
            "tools/list",
            envelopes.tools_list(),
            RpcOutcome::transport_failure("refused"),
        );

        let list = history.get(0).unwrap();
        let call = history.get(1).unwrap();
        assert_eq!(arguments_preview(call, 40), r#"{"key":"SYSTEM_PROMPT"}"#);
        assert_eq!(arguments_preview(call, 10), r#"{"key":..."#);
        assert_eq!(arguments_preview(list, 40), "");
    }

    #[test]
    fn test_pretty() {
        let value = serde_json::json!({"a": 1});
        assert_eq!(pretty(&value), "{\n  \"a\": 1\n}");
    }
}
