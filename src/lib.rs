//! # Codex AI
//!
//! A conversational coding agent for the terminal.
//!
//! This library provides:
//! - An interactive shell that forwards free-text queries to an agent loop
//! - A structured think → action → observe → output protocol over JSON
//! - A registry of local tools (files, shell, git, React scaffolds, scraping)
//! - Routing between two chat backends behind one contract
//!
//! ## Architecture
//!
//! The agent drives a reasoning protocol in a loop:
//! 1. Send the transcript to the selected model, expecting one JSON step
//! 2. Render think steps; dispatch action steps to the tool registry
//! 3. Feed tool results back as synthetic observe messages
//! 4. Stop on an output step, a protocol violation, or the step ceiling
//!
//! ## Example
//!
//! ```rust,ignore
//! use codex_ai::{config::Config, shell::Shell};
//!
//! let config = Config::from_env()?;
//! // ... build the router, registry, and agent, then:
//! shell.run().await?;
//! ```

pub mod agent;
pub mod config;
pub mod ledger;
pub mod llm;
pub mod models;
pub mod protocol;
pub mod shell;
pub mod tools;
pub mod ui;

pub use config::Config;
