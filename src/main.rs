//! Codex AI - Interactive Terminal Entry Point
//!
//! Starts the shell that reads queries and drives the agent loop.

use std::sync::Arc;

use codex_ai::agent::Agent;
use codex_ai::config::Config;
use codex_ai::ledger::UsageLedger;
use codex_ai::llm::ModelRouter;
use codex_ai::models::ModelSelector;
use codex_ai::shell::Shell;
use codex_ai::tools::ToolRegistry;
use codex_ai::ui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load a local .env before reading configuration.
    dotenvy::dotenv().ok();

    // Diagnostics go through tracing; the transcript rendering is stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codex_ai=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    tracing::debug!(model = config.default_model.id(), "loaded configuration");

    let selector = ModelSelector::new(config.default_model);
    let ledger = UsageLedger::new();
    let tools = Arc::new(ToolRegistry::with_default_tools()?);
    let router = Arc::new(ModelRouter::new(&config, selector.clone(), ledger.clone()));
    let agent = Agent::new(router, tools, ledger, &config);
    let shell = Shell::new(agent, selector);

    tokio::select! {
        result = shell.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            println!();
            ui::print_farewell();
        }
    }

    Ok(())
}
