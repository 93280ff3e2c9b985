//! REPL (Read-Eval-Print Loop) for browsing and calling tools interactively.
//!
//! One [`McpSession`] lives for the whole loop, so the catalog and the call
//! history accumulate across commands.

use anyhow::Result;
use clap::Args;
use console::{Style, Term, style};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};

use serde_json::Value;

use mcp_admin_config::Preset;
use mcp_admin_core::{McpError, McpSession, parse_arguments};

use super::output::{self, print_dim, print_error};
use super::preset::read_override;
use super::tools::refresh;
use super::{Context, ResolvedSession};

/// Arguments for `mcp-admin repl`.
#[derive(Args, Debug)]
pub struct ReplArgs {
    /// Don't fetch the tool list on startup
    #[arg(long)]
    pub no_refresh: bool,
}

/// Run `mcp-admin repl`.
pub async fn run(args: ReplArgs, ctx: &Context) -> Result<()> {
    let (session, resolved) = ctx.open_session()?;
    let presets = mcp_admin_config::load_config()?.presets;
    let mut repl = Repl::new(session, resolved, presets, ctx.clone())?;
    repl.run(!args.no_refresh).await
}

/// REPL state and configuration.
pub struct Repl {
    session: McpSession,
    resolved: ResolvedSession,
    presets: Vec<Preset>,
    ctx: Context,
    editor: Editor<(), DefaultHistory>,
    term: Term,
}

impl Repl {
    /// Create a new REPL instance.
    pub fn new(
        session: McpSession,
        resolved: ResolvedSession,
        presets: Vec<Preset>,
        ctx: Context,
    ) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .build();

        let editor = Editor::with_config(config)?;

        Ok(Self {
            session,
            resolved,
            presets,
            // Listings inside the REPL are always human-readable.
            ctx: Context {
                json_output: false,
                ..ctx
            },
            editor,
            term: Term::stdout(),
        })
    }

    /// Run the REPL loop.
    pub async fn run(&mut self, refresh_first: bool) -> Result<()> {
        self.print_welcome();

        if refresh_first {
            self.refresh_tools().await;
        }

        loop {
            let prompt = self.format_prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if !line.starts_with('/') {
                        print_dim("Commands start with '/'. Type /help for the list.");
                        continue;
                    }

                    match self.handle_slash_command(line).await {
                        Ok(ControlFlow::Continue) => continue,
                        Ok(ControlFlow::Exit) => break,
                        Err(e) => {
                            print_error(&format!("Command error: {}", e));
                            continue;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - drop the current line but don't exit
                    println!();
                    print_dim("(Interrupted - type /quit to exit)");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(e) => {
                    print_error(&format!("Input error: {}", e));
                    break;
                }
            }
        }

        print_dim("Goodbye!");
        Ok(())
    }

    /// Handle a slash command.
    async fn handle_slash_command(&mut self, input: &str) -> Result<ControlFlow> {
        let command = match parse_command(input) {
            Ok(command) => command,
            Err(message) => {
                print_error(&message);
                print_dim("Type /help for available commands");
                return Ok(ControlFlow::Continue);
            }
        };

        match command {
            Command::Quit => return Ok(ControlFlow::Exit),
            Command::Help => self.print_help(),
            Command::Clear => self.term.clear_screen()?,
            Command::Status => self.print_status(),
            Command::Refresh => {
                self.refresh_tools().await;
                if !self.session.catalog().is_empty() {
                    output::print_tools(self.session.catalog().tools(), false);
                }
            }
            Command::List { full } => output::print_tools(self.session.catalog().tools(), full),
            Command::Schema(tool) => self.print_schema(tool)?,
            Command::Call { tool, arguments } => self.call(tool, arguments).await?,
            Command::History(n) => {
                let n = n.unwrap_or(self.resolved.history_display);
                let history = self.session.history();
                output::print_history(history.recent(n), history.len());
            }
            Command::Show(index) => match self.session.history().get(index) {
                Some(entry) => output::print_history_entry(index, entry),
                None => print_error(&format!("No history entry #{}", index)),
            },
            Command::Presets => {
                if self.presets.is_empty() {
                    print_dim("No presets configured. Add them under 'presets:' in the config file.");
                } else {
                    output::print_presets(&self.presets);
                }
            }
            Command::Preset { name, overrides } => self.run_preset(name, &overrides).await?,
            Command::Empty => print_dim("Type /help for available commands"),
        }

        Ok(ControlFlow::Continue)
    }

    /// Run a preset. The operator edits the arguments before they are checked.
    async fn run_preset(&mut self, name: &str, overrides: &[&str]) -> Result<()> {
        let Some(preset) = self.presets.iter().find(|p| p.name == name).cloned() else {
            print_error(&format!("No preset named '{}'", name));
            print_dim("Type /preset to list them.");
            return Ok(());
        };

        let overrides = overrides
            .iter()
            .map(|text| read_override(text))
            .collect::<Result<Vec<_>>>()?;
        let initial = serde_json::to_string(&Value::Object(preset.arguments(&overrides)))?;

        let prompt = format!("{} ", style(format!("{}>", preset.tool)).yellow());
        let text = match self.editor.readline_with_initial(&prompt, (&initial, "")) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                print_dim("(Call cancelled)");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let edited = match parse_arguments(&text) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                print_error("Arguments must be a JSON object");
                print_dim("Nothing was sent.");
                return Ok(());
            }
            Err(e) => {
                print_error(&e.to_string());
                print_dim("Nothing was sent.");
                return Ok(());
            }
        };

        let arguments = match preset.finalize(edited.clone(), false) {
            Ok(arguments) => arguments,
            Err(e) if e.is_confirmation_required() => {
                print_error(&e.to_string());
                if !self.confirm(&preset)? {
                    print_dim("Nothing was sent.");
                    return Ok(());
                }
                preset.finalize(edited, true)?
            }
            Err(e) => {
                print_error(&e.to_string());
                print_dim("Nothing was sent.");
                return Ok(());
            }
        };

        let spinner = output::spinner(format!("Calling {} ({})", preset.tool, preset.name));
        let outcome = self.session.call_tool(&preset.tool, Value::Object(arguments)).await;
        spinner.finish_and_clear();
        output::print_outcome(&preset.tool, &outcome);
        Ok(())
    }

    /// Ask before setting a preset's confirmation flag.
    fn confirm(&mut self, preset: &Preset) -> Result<bool> {
        let flag = preset.confirm.as_ref().map(|g| g.flag.as_str()).unwrap_or("confirm");
        let prompt = format!("Send with {}=true? [y/N] ", flag);
        match self.editor.readline(&prompt) {
            Ok(answer) => Ok(matches!(answer.trim(), "y" | "Y" | "yes")),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Refresh the catalog; failures are reported and the old catalog kept.
    async fn refresh_tools(&mut self) {
        match refresh(&mut self.session, &self.ctx).await {
            Ok(()) => {
                let green = Style::new().green();
                println!(
                    "{} {} tools available",
                    green.apply_to("✓"),
                    self.session.catalog().len()
                );
            }
            Err(e) => {
                tracing::debug!(error = %e, "catalog refresh failed");
                if !self.session.catalog().is_empty() {
                    print_dim(&format!(
                        "Keeping the previous list of {} tools.",
                        self.session.catalog().len()
                    ));
                }
            }
        }
    }

    fn print_schema(&self, name: &str) -> Result<()> {
        let tool = self.session.tool(name)?;
        println!("{}", style(&tool.name).cyan().bold());
        if !tool.description.is_empty() {
            println!("{}", output::textwrap_simple(&tool.description, 76));
        }
        println!("{}", output::pretty(&tool.input_schema));
        println!("{}", Style::new().dim().apply_to("Defaults:"));
        println!("{}", self.session.default_arguments_text(name)?);
        Ok(())
    }

    /// Call a tool. Without argument text the operator edits the defaults.
    async fn call(&mut self, tool: &str, arguments: Option<&str>) -> Result<()> {
        let text = match arguments {
            Some(text) => text.to_string(),
            None => {
                let defaults = match self.session.default_arguments(tool) {
                    Ok(defaults) => serde_json::to_string(&defaults)?,
                    Err(McpError::ToolNotFound(_)) => {
                        print_dim(&format!("'{}' is not in the tool list; starting from {{}}", tool));
                        "{}".to_string()
                    }
                    Err(e) => return Err(e.into()),
                };
                let prompt = format!("{} ", style("args>").yellow());
                match self.editor.readline_with_initial(&prompt, (&defaults, "")) {
                    Ok(line) => line,
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                        print_dim("(Call cancelled)");
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        let spinner = output::spinner(format!("Calling {}", tool));
        let result = self.session.call_tool_with_text(tool, &text).await;
        spinner.finish_and_clear();

        match result {
            Ok(outcome) => output::print_outcome(tool, &outcome),
            Err(e) if e.is_malformed_input() => {
                print_error(&e.to_string());
                print_dim("Nothing was sent.");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    fn print_welcome(&self) {
        let dim = Style::new().dim();
        println!();
        println!("{}", style("mcp-admin").bold().cyan());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!("{}", dim.apply_to(format!("Endpoint: {}", self.session.endpoint())));
        println!("{}", dim.apply_to("Use /help for commands, Ctrl+D to exit."));
        println!();
    }

    fn print_help(&self) {
        let dim = Style::new().dim();
        println!();
        println!("{}", style("Available Commands").bold());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!("  {}  - Fetch the tool list", style("/tools").cyan());
        println!("  {}  - Show the cached tool list", style("/list [--full]").cyan());
        println!("  {}  - Show a tool's schema and defaults", style("/schema <tool>").cyan());
        println!(
            "  {}  - Call a tool (edit defaults when JSON is omitted)",
            style("/call <tool> [json]").cyan()
        );
        println!(
            "  {}  - Show recent calls, newest first",
            style("/history [n]").cyan()
        );
        println!("  {}  - Show a call's request and response", style("/show [i]").cyan());
        println!(
            "  {}  - Run a saved call (lists presets without a name)",
            style("/preset [name] [key=value ...]").cyan()
        );
        println!("  {}  - Show session status", style("/status").cyan());
        println!("  {}  - Clear the screen", style("/clear").cyan());
        println!("  {}  - Show this help", style("/help, /h, /?").cyan());
        println!("  {}  - Exit the REPL", style("/quit, /q").cyan());
        println!();
        println!("{}", dim.apply_to("Keyboard shortcuts:"));
        println!("  {} - Discard the current line", dim.apply_to("Ctrl+C"));
        println!("  {} - Exit the REPL", dim.apply_to("Ctrl+D"));
        println!();
    }

    fn print_status(&self) {
        let dim = Style::new().dim();
        let config = self.session.config();
        println!("Endpoint: {}", config.endpoint);
        if let Some(name) = &self.resolved.context_name {
            println!("Context:  {}", name);
        }
        println!(
            "Auth:     {}",
            if config.bearer_token.is_some() {
                "bearer"
            } else {
                "none"
            }
        );

        let catalog = self.session.catalog();
        match catalog.refreshed_at() {
            Some(at) => println!(
                "Tools:    {} {}",
                catalog.len(),
                dim.apply_to(format!("(listed {})", at.format("%H:%M:%S UTC")))
            ),
            None => println!("Tools:    {}", dim.apply_to("not listed yet")),
        }

        let history = self.session.history();
        println!("History:  {} entries", history.len());
        if history.evicted() > 0 {
            println!(
                "          {}",
                dim.apply_to(format!("{} older entries dropped", history.evicted()))
            );
        }
    }

    fn format_prompt(&self) -> String {
        format!("{} ", style("mcp>").cyan().bold())
    }
}

/// Control flow for the REPL.
pub enum ControlFlow {
    Continue,
    Exit,
}

/// A parsed slash command.
#[derive(Debug, PartialEq)]
pub enum Command<'a> {
    Quit,
    Help,
    Clear,
    Status,
    Refresh,
    List { full: bool },
    Schema(&'a str),
    Call { tool: &'a str, arguments: Option<&'a str> },
    History(Option<usize>),
    Show(usize),
    Presets,
    Preset { name: &'a str, overrides: Vec<&'a str> },
    Empty,
}

/// Parse a line starting with `/`. Errors are messages for the operator.
pub fn parse_command(input: &str) -> std::result::Result<Command<'_>, String> {
    let body = input.strip_prefix('/').unwrap_or(input);
    let (cmd, rest) = match body.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (body, ""),
    };

    let command = match cmd {
        "quit" | "q" | "exit" => Command::Quit,
        "help" | "h" | "?" => Command::Help,
        "clear" | "cls" => Command::Clear,
        "status" => Command::Status,
        "tools" | "refresh" => Command::Refresh,
        "list" | "ls" => Command::List {
            full: rest == "--full",
        },
        "schema" if rest.is_empty() => return Err("usage: /schema <tool>".to_string()),
        "schema" => Command::Schema(rest),
        "call" if rest.is_empty() => return Err("usage: /call <tool> [json]".to_string()),
        "call" => match rest.split_once(char::is_whitespace) {
            Some((tool, json)) => Command::Call {
                tool,
                arguments: Some(json.trim()),
            },
            None => Command::Call {
                tool: rest,
                arguments: None,
            },
        },
        "history" if rest.is_empty() => Command::History(None),
        "history" => Command::History(Some(
            rest.parse()
                .map_err(|_| format!("usage: /history [n] (expected a number, got '{}')", rest))?,
        )),
        "show" if rest.is_empty() => Command::Show(0),
        "show" => Command::Show(
            rest.parse()
                .map_err(|_| format!("usage: /show [index] (expected an index, got '{}')", rest))?,
        ),
        "preset" | "presets" if rest.is_empty() => Command::Presets,
        "preset" => {
            let mut words = rest.split_whitespace();
            let name = words.next().unwrap_or_default();
            Command::Preset {
                name,
                overrides: words.collect(),
            }
        }
        "" => Command::Empty,
        _ => return Err(format!("Unknown command: /{}", cmd)),
    };

    Ok(command)
}
