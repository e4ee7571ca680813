//! Agent module - the core conversational loop.
//!
//! The agent drives a structured protocol against the model:
//! 1. Build the transcript with system prompt and user query
//! 2. Call the model, parse the reply into a protocol step
//! 3. Execute requested tools and feed observations back
//! 4. Repeat until an output step or the step ceiling

mod agent_loop;
mod prompt;

pub use agent_loop::{Agent, AgentError, RunOutcome};
pub use prompt::build_system_prompt;
