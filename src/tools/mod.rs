//! Tool system: the trait, the tool groups, and the conflict-checked
//! registry.
//!
//! Tools are the agent's hands. Each one takes a JSON argument object
//! (immediately deserialized into the tool's own typed record) and returns
//! a human-readable result string. Internal failures never escape as
//! errors past the registry boundary: they are flattened into a prefixed
//! failure string the model reads in the next turn, because tool failures
//! are data the model is expected to reason about, not control flow.

mod fs;
mod git;
mod scaffold;
mod scrape;
mod terminal;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Marker prefixed to every tool failure fed back into the transcript.
pub const TOOL_FAILURE_PREFIX: &str = "⚠ tool error: ";

/// A named, externally-effecting operation the model can request.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable registry name; lookup is case-sensitive exact match.
    fn name(&self) -> &str;

    /// One-line description injected into the system prompt.
    fn description(&self) -> &str;

    /// Run the tool against the workspace directory.
    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String>;
}

/// Name and description of a registered tool, for prompt construction.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate tool name registered: {0}")]
    DuplicateTool(String),
}

/// Flat namespace of tools, built once at startup by merging the
/// independently owned groups. Name collisions abort startup.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Build the default registry from every tool group.
    pub fn with_default_tools() -> Result<Self, RegistryError> {
        let groups = [
            fs::tools(),
            terminal::tools(),
            git::tools(),
            scaffold::tools(),
            scrape::tools(),
        ];
        let mut registry = Self {
            tools: HashMap::new(),
        };
        for group in groups {
            for tool in group {
                registry.register(tool)?;
            }
        }
        Ok(registry)
    }

    /// Build a registry from an explicit tool list (useful for testing).
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Result<Self, RegistryError> {
        let mut registry = Self {
            tools: HashMap::new(),
        };
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        match self.tools.entry(tool.name().to_string()) {
            Entry::Occupied(occupied) => Err(RegistryError::DuplicateTool(occupied.key().clone())),
            Entry::Vacant(vacant) => {
                vacant.insert(tool);
                Ok(())
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All registered tools, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .values()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
            })
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Execute a registered tool by name.
    ///
    /// Returns `None` when no tool has this name (the caller treats that as
    /// fatal for the turn). A tool-internal error comes back as a prefixed
    /// failure string rather than an `Err`.
    pub async fn execute(&self, name: &str, args: Value, workspace: &Path) -> Option<String> {
        let tool = self.tools.get(name)?;
        let result = match tool.execute(args, workspace).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool execution failed");
                format!("{}{:#}", TOOL_FAILURE_PREFIX, e)
            }
        };
        Some(result)
    }
}
