//! Terminal presentation: banner, prompts, and loop event rendering.
//!
//! Purely a sink. Nothing here feeds decisions back into the agent.

use colored::Colorize;
use serde_json::Value;

use crate::ledger::{CallRecord, SessionTotals};
use crate::models::ModelId;

const BANNER: &str = r#"
  ██████╗ ██████╗ ██████╗ ███████╗██╗  ██╗     █████╗ ██╗
 ██╔════╝██╔═══██╗██╔══██╗██╔════╝╚██╗██╔╝    ██╔══██╗██║
 ██║     ██║   ██║██║  ██║█████╗   ╚███╔╝     ███████║██║
 ██║     ██║   ██║██║  ██║██╔══╝   ██╔██╗     ██╔══██║██║
 ╚██████╗╚██████╔╝██████╔╝███████╗██╔╝ ██╗    ██║  ██║██║
  ╚═════╝ ╚═════╝ ╚═════╝ ╚══════╝╚═╝  ╚═╝    ╚═╝  ╚═╝╚═╝
"#;

fn separator() -> String {
    "─".repeat(60)
}

pub fn print_banner(model: ModelId) {
    // ANSI clear screen + cursor home, like `clear`.
    print!("\x1B[2J\x1B[1;1H");
    println!("{}", BANNER.cyan());
    println!("{}", "              Advanced Coding Assistant".dimmed());
    println!(
        "{}",
        format!(
            "              Current model: {} ({})",
            model.display_name(),
            model.provider().label()
        )
        .yellow()
    );
    println!();
}

pub fn print_welcome() {
    println!(
        "{}",
        "Welcome to CODEX AI - your coding assistant.".green()
    );
    println!();
    println!("{}", "What I can help you with:".cyan());
    println!("   • Full-stack development & React project scaffolding");
    println!("   • Cloning websites into React projects");
    println!("   • File system operations & project management");
    println!("   • Git operations & version control");
    println!("   • Package management, builds & tests");
    println!();
    println!(
        "{}",
        "Commands: \"exit\", \"quit\", \"clear\", \"help\", \"model\"".dimmed()
    );
    println!("{}", separator().dimmed());
    println!();
}

pub fn print_help() {
    println!("{}", "Available commands:".cyan());
    println!("   • exit/quit - end the session");
    println!("   • clear     - clear the screen");
    println!("   • help      - show this help");
    println!("   • model     - switch the AI model");
    println!();
    println!("{}", "Example queries:".cyan());
    println!("   • \"Create a React todo app called my-todos\"");
    println!("   • \"Clone https://example.com into a React project\"");
    println!("   • \"Create a git repository and make the first commit\"");
    println!("   • \"Search the src directory for TODO comments\"");
    println!();
}

pub fn print_query_header(query: &str, model: ModelId) {
    println!("{} {}", "▶".green(), "PROCESSING QUERY:".green().bold());
    println!("   {}", query);
    println!(
        "{}",
        format!("   Using: {} ({})", model.display_name(), model.provider().label()).dimmed()
    );
    println!();
    println!("{}", separator().dimmed());
    println!();
}

pub fn print_thinking(content: &str) {
    println!("{} {}", "●".yellow(), "THINKING:".yellow().bold());
    println!("{}", format!("   {}", content).dimmed());
    println!();
}

pub fn print_action(tool: &str, input: &Value) {
    println!("{} {}", "●".blue(), "ACTION:".blue().bold());
    println!("   {} {}", "Tool:".cyan(), tool);
    let pretty = serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string());
    println!(
        "   {} {}",
        "Input:".cyan(),
        pretty.replace('\n', "\n          ").dimmed()
    );
    println!();
}

pub fn print_observe(content: &str) {
    println!("{} {}", "●".green(), "OBSERVE:".green().bold());
    println!("   {}", content.replace('\n', "\n   "));
    println!();
}

pub fn print_output(content: &str) {
    println!("{} {}", "●".magenta(), "OUTPUT:".magenta().bold());
    println!("   {}", content.replace('\n', "\n   "));
    println!();
}

pub fn print_simple_response(content: &str) {
    println!("{} {}", "●".magenta(), "CODEX:".magenta().bold());
    println!("   {}", content);
    println!();
    println!("{}", separator().dimmed());
    println!();
}

pub fn print_call_usage(call: &CallRecord) {
    println!(
        "{}",
        format!(
            "   {} usage → input: {}, output: {}, cost: ${:.4}",
            call.provider.label(),
            call.input_tokens,
            call.output_tokens,
            call.cost_usd
        )
        .dimmed()
    );
}

pub fn print_session_totals(totals: &SessionTotals) {
    println!("{}", separator().dimmed());
    println!("{}", "API cost summary (this session)".cyan());
    println!("   Calls: {}", totals.calls);
    println!(
        "   Tokens → input: {}, output: {}",
        totals.input_tokens, totals.output_tokens
    );
    println!("   Estimated cost: ${:.4}", totals.cost_usd);
    println!("{}", separator().dimmed());
    println!();
}

pub fn print_farewell() {
    println!("{}", "Goodbye! Thanks for using CODEX AI.".yellow());
}
