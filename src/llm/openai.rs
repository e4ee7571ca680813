//! OpenAI chat-completions backend adapter.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{Completion, LlmError, TokenUsage};
use crate::protocol::ChatMessage;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const PROVIDER: &str = "OpenAI";
const KEY_ENV_VAR: &str = "OPEN_AI_KEY";

/// OpenAI API client. The transcript maps 1:1 onto the wire format: a flat
/// ordered message list, system message first.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    response_format: ResponseFormat,
    messages: &'a [ChatMessage],
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    /// Run one chat completion in structured (JSON object) output mode.
    pub async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey {
            provider: PROVIDER,
            env_var: KEY_ENV_VAR,
        })?;

        let request = ChatCompletionRequest {
            model,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages,
        };

        let response = self
            .http
            .post(API_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LlmError::Auth {
                provider: PROVIDER,
                env_var: KEY_ENV_VAR,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                provider: PROVIDER,
                message: format!("{}: {}", status, extract_error_message(&body)),
            });
        }

        let body: ChatCompletionResponse =
            response.json().await.map_err(|e| LlmError::MalformedReply {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::MalformedReply {
                provider: PROVIDER,
                message: "reply contained no choices".to_string(),
            })?;

        let usage = body.usage.unwrap_or_default();
        Ok(Completion {
            content,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

/// Pull the human-readable message out of an OpenAI error body, falling
/// back to the raw text.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
