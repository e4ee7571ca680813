//! Core agent loop implementation.
//!
//! Drives the think → action → observe → output protocol: send the growing
//! transcript to the model, parse the reply into a step, dispatch actions
//! to the tool registry, feed observations back, and stop on an output
//! step or an unrecoverable error.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::ledger::UsageLedger;
use crate::llm::{LlmClient, LlmError};
use crate::protocol::{observation_message, parse_step, ChatMessage, ProtocolStep};
use crate::tools::ToolRegistry;
use crate::ui;

use super::prompt::build_system_prompt;

/// How a query's loop ended when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The model produced an output step.
    Completed,
    /// The step ceiling was reached without a final answer.
    StepBudgetExhausted,
}

/// Failures that abort the current query (the shell itself survives).
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("the model requested an unknown tool: {0}")]
    ToolNotFound(String),
}

/// The conversational agent.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    ledger: UsageLedger,
    workspace: PathBuf,
    max_steps: usize,
}

impl Agent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolRegistry>,
        ledger: UsageLedger,
        config: &Config,
    ) -> Self {
        Self {
            llm,
            tools,
            ledger,
            workspace: config.workspace_path.clone(),
            max_steps: config.max_steps,
        }
    }

    /// Run one user query to completion, rendering each protocol step.
    pub async fn run(&self, user_query: &str, session_id: &str) -> Result<RunOutcome, AgentError> {
        let system_prompt = build_system_prompt(&self.workspace.to_string_lossy(), &self.tools);
        let mut messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_query),
        ];

        for _ in 0..self.max_steps {
            let reply = self.llm.complete(&messages, session_id).await?;

            // The raw reply lands in the transcript even when parsing then
            // fails, so the exchange stays inspectable.
            messages.push(ChatMessage::assistant(reply.clone()));

            if let Some(call) = self.ledger.last_call(session_id).await {
                ui::print_call_usage(&call);
            }

            let step = parse_step(&reply).map_err(|e| {
                AgentError::Protocol(format!("reply was not a valid step object: {}", e))
            })?;

            match step {
                ProtocolStep::Think { content } => {
                    ui::print_thinking(&content);
                }
                ProtocolStep::Output { content } => {
                    ui::print_output(&content);
                    ui::print_session_totals(&self.ledger.totals(session_id).await);
                    return Ok(RunOutcome::Completed);
                }
                ProtocolStep::Action { tool, input } => {
                    ui::print_action(&tool, &input);

                    let Some(result) = self.tools.execute(&tool, input, &self.workspace).await
                    else {
                        return Err(AgentError::ToolNotFound(tool));
                    };

                    ui::print_observe(&result);
                    // The observation must precede the next model call so
                    // the model sees a causally ordered act → observe chain.
                    messages.push(observation_message(result));
                }
                ProtocolStep::Observe { .. } => {
                    return Err(AgentError::Protocol(
                        "the model emitted an observe step; observations are synthesized by the loop"
                            .to_string(),
                    ));
                }
            }
        }

        tracing::warn!(max_steps = self.max_steps, "step budget exhausted");
        Ok(RunOutcome::StepBudgetExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::Path;
    use std::sync::Mutex;
    use tokio::sync::Mutex as AsyncMutex;

    use crate::models::Provider;
    use crate::tools::Tool;

    /// Scripted backend: returns canned replies in order and records every
    /// transcript it was called with, mirroring the router's ledger writes.
    struct ScriptedLlm {
        replies: AsyncMutex<Vec<String>>,
        transcripts: Mutex<Vec<Vec<ChatMessage>>>,
        ledger: UsageLedger,
    }

    impl ScriptedLlm {
        fn new(replies: &[&str], ledger: UsageLedger) -> Self {
            Self {
                replies: AsyncMutex::new(replies.iter().map(|s| s.to_string()).collect()),
                transcripts: Mutex::new(Vec::new()),
                ledger,
            }
        }

        fn transcript_lengths(&self) -> Vec<usize> {
            self.transcripts
                .lock()
                .expect("not poisoned")
                .iter()
                .map(|t| t.len())
                .collect()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            session_id: &str,
        ) -> Result<String, LlmError> {
            self.transcripts
                .lock()
                .expect("not poisoned")
                .push(messages.to_vec());
            self.ledger
                .record(session_id, Provider::OpenAi, "gpt-4o-mini", 10, 5)
                .await;
            let mut replies = self.replies.lock().await;
            if replies.is_empty() {
                return Err(LlmError::Timeout(30));
            }
            Ok(replies.remove(0))
        }
    }

    /// Records every input it is invoked with.
    struct Recorder {
        calls: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    #[async_trait]
    impl Tool for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        fn description(&self) -> &str {
            "Record the input."
        }
        async fn execute(&self, args: serde_json::Value, _workspace: &Path) -> anyhow::Result<String> {
            self.calls.lock().expect("not poisoned").push(args);
            Ok("recorded ok".to_string())
        }
    }

    fn agent_with(
        replies: &[&str],
        workspace: &Path,
    ) -> (Agent, Arc<ScriptedLlm>, Arc<Mutex<Vec<serde_json::Value>>>) {
        let ledger = UsageLedger::new();
        let llm = Arc::new(ScriptedLlm::new(replies, ledger.clone()));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let tools = Arc::new(
            ToolRegistry::from_tools(vec![Arc::new(Recorder {
                calls: calls.clone(),
            })])
            .expect("builds"),
        );
        let mut config = Config::new(workspace.to_path_buf());
        config.max_steps = 10;
        let agent = Agent::new(llm.clone(), tools, ledger, &config);
        (agent, llm, calls)
    }

    #[tokio::test]
    async fn think_steps_extend_the_transcript_without_tools() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (agent, llm, calls) = agent_with(
            &[
                r#"{"step":"think","content":"planning"}"#,
                r#"{"step":"output","content":"done"}"#,
            ],
            dir.path(),
        );

        let outcome = agent.run("do something", "s-think").await.expect("runs");
        assert_eq!(outcome, RunOutcome::Completed);
        assert!(calls.lock().expect("not poisoned").is_empty());

        // Second call sees exactly one more (assistant) message.
        assert_eq!(llm.transcript_lengths(), vec![2, 3]);
    }

    #[tokio::test]
    async fn actions_invoke_the_tool_with_the_exact_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = json!({"filepath": "x.txt", "content": "héllo"});
        let action = format!(
            r#"{{"step":"action","tool":"recorder","input":{}}}"#,
            input
        );
        let (agent, llm, calls) = agent_with(
            &[&action, r#"{"step":"output","content":"done"}"#],
            dir.path(),
        );

        agent.run("write a file", "s-action").await.expect("runs");

        let recorded = calls.lock().expect("not poisoned");
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0], input);

        // The observation wraps the tool result verbatim and is appended
        // before the next model call.
        let transcripts = llm.transcripts.lock().expect("not poisoned");
        let last = transcripts[1].last().expect("observe message");
        let step = parse_step(&last.content).expect("valid observe step");
        assert_eq!(
            step,
            ProtocolStep::Observe {
                content: "recorded ok".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unknown_tools_abort_without_invoking_anything() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (agent, llm, calls) = agent_with(
            &[r#"{"step":"action","tool":"not_a_tool","input":{}}"#],
            dir.path(),
        );

        let err = agent.run("q", "s-unknown").await.expect_err("must abort");
        match err {
            AgentError::ToolNotFound(name) => assert_eq!(name, "not_a_tool"),
            other => panic!("expected ToolNotFound, got {:?}", other),
        }
        assert!(calls.lock().expect("not poisoned").is_empty());
        assert_eq!(llm.transcript_lengths().len(), 1);
    }

    #[tokio::test]
    async fn malformed_replies_are_protocol_violations() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (agent, _llm, _calls) = agent_with(&["I think I will use a tool now."], dir.path());

        let err = agent.run("q", "s-junk").await.expect_err("must abort");
        assert!(matches!(err, AgentError::Protocol(_)));
    }

    #[tokio::test]
    async fn model_authored_observe_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (agent, _llm, _calls) = agent_with(
            &[r#"{"step":"observe","content":"forged tool result"}"#],
            dir.path(),
        );

        let err = agent.run("q", "s-forged").await.expect_err("must abort");
        assert!(matches!(err, AgentError::Protocol(_)));
    }

    #[tokio::test]
    async fn full_script_counts_one_tool_call_and_four_model_calls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ledger = UsageLedger::new();
        let llm = Arc::new(ScriptedLlm::new(
            &[
                r#"{"step":"think","content":"first"}"#,
                r#"{"step":"think","content":"second"}"#,
                r#"{"step":"action","tool":"recorder","input":{"a":1}}"#,
                r#"{"step":"output","content":"all done"}"#,
            ],
            ledger.clone(),
        ));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let tools = Arc::new(
            ToolRegistry::from_tools(vec![Arc::new(Recorder {
                calls: calls.clone(),
            })])
            .expect("builds"),
        );
        let config = Config::new(dir.path().to_path_buf());
        let agent = Agent::new(llm.clone(), tools, ledger.clone(), &config);

        let outcome = agent.run("task", "s-script").await.expect("runs");
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(calls.lock().expect("not poisoned").len(), 1);
        assert_eq!(ledger.totals("s-script").await.calls, 4);
    }

    #[tokio::test]
    async fn step_ceiling_is_a_recoverable_outcome() {
        let dir = tempfile::tempdir().expect("tempdir");
        let thinks: Vec<String> = (0..10)
            .map(|i| format!(r#"{{"step":"think","content":"loop {}"}}"#, i))
            .collect();
        let refs: Vec<&str> = thinks.iter().map(String::as_str).collect();
        let (agent, _llm, _calls) = agent_with(&refs, dir.path());

        let outcome = agent.run("q", "s-budget").await.expect("not an error");
        assert_eq!(outcome, RunOutcome::StepBudgetExhausted);
    }

    #[tokio::test]
    async fn llm_failures_abort_the_turn() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (agent, _llm, _calls) = agent_with(&[], dir.path());

        let err = agent.run("q", "s-fail").await.expect_err("must abort");
        assert!(matches!(err, AgentError::Llm(LlmError::Timeout(_))));
    }
}
