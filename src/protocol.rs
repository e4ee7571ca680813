//! Chat transcript types and the structured step protocol.
//!
//! The model is instructed to reply with exactly one JSON object per turn,
//! discriminated by a `step` field. Deserializing into [`ProtocolStep`] is
//! the schema check: anything that is not valid JSON with a recognized tag
//! and the fields that tag requires is a protocol violation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One transcript entry. The transcript is append-only within a turn and
/// always begins with exactly one system message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One turn of the structured reasoning protocol.
///
/// `Observe` is only ever synthesized by the agent loop to carry a tool
/// result back to the model; a model reply carrying that tag is rejected by
/// the loop even though it deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum ProtocolStep {
    Think {
        content: String,
    },
    Action {
        tool: String,
        #[serde(default)]
        input: Value,
    },
    Observe {
        content: String,
    },
    Output {
        content: String,
    },
}

/// Parse a raw model reply into a single protocol step.
pub fn parse_step(raw: &str) -> Result<ProtocolStep, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Build the synthetic assistant message that feeds a tool result back to
/// the model, appended to the transcript before the next model call.
pub fn observation_message(result: impl Into<String>) -> ChatMessage {
    let step = ProtocolStep::Observe {
        content: result.into(),
    };
    // Serializing a unit of our own enum cannot fail.
    let content = serde_json::to_string(&step).unwrap_or_default();
    ChatMessage::assistant(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_think_step() {
        let step = parse_step(r#"{"step":"think","content":"planning"}"#).expect("valid step");
        assert_eq!(
            step,
            ProtocolStep::Think {
                content: "planning".to_string()
            }
        );
    }

    #[test]
    fn parses_action_step_and_preserves_input() {
        let raw = r#"{"step":"action","tool":"write_file","input":{"filepath":"a.txt","content":"héllo\nworld"}}"#;
        let step = parse_step(raw).expect("valid step");
        match step {
            ProtocolStep::Action { tool, input } => {
                assert_eq!(tool, "write_file");
                assert_eq!(input["filepath"], json!("a.txt"));
                assert_eq!(input["content"], json!("héllo\nworld"));
            }
            other => panic!("expected action, got {:?}", other),
        }
    }

    #[test]
    fn action_without_input_defaults_to_null() {
        let step = parse_step(r#"{"step":"action","tool":"git_status"}"#).expect("valid step");
        assert_eq!(
            step,
            ProtocolStep::Action {
                tool: "git_status".to_string(),
                input: Value::Null,
            }
        );
    }

    #[test]
    fn parses_output_step() {
        let step = parse_step(r#"{"step":"output","content":"done"}"#).expect("valid step");
        assert_eq!(
            step,
            ProtocolStep::Output {
                content: "done".to_string()
            }
        );
    }

    #[test]
    fn rejects_unknown_step_tag() {
        assert!(parse_step(r#"{"step":"ponder","content":"hm"}"#).is_err());
    }

    #[test]
    fn rejects_non_json_text() {
        assert!(parse_step("Sure! Here is what I will do:").is_err());
        assert!(parse_step("").is_err());
    }

    #[test]
    fn rejects_missing_required_fields() {
        // An action without a tool name is not a valid step.
        assert!(parse_step(r#"{"step":"action","input":{}}"#).is_err());
    }

    #[test]
    fn observation_message_round_trips() {
        let message = observation_message("wrote 3 files");
        assert_eq!(message.role, Role::Assistant);
        let step = parse_step(&message.content).expect("observation is a valid step");
        assert_eq!(
            step,
            ProtocolStep::Observe {
                content: "wrote 3 files".to_string()
            }
        );
    }

    #[test]
    fn roles_serialize_lowercase() {
        let message = ChatMessage::user("hi");
        let value = serde_json::to_value(&message).expect("serializable");
        assert_eq!(value["role"], json!("user"));
    }
}
