//! Gemini generateContent backend adapter.
//!
//! Gemini does not take a flat message list: the system instruction travels
//! in its own field and the chat history is replayed as `contents` entries
//! with `user` / `model` roles, newest turn last.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{Completion, LlmError, TokenUsage};
use crate::protocol::{ChatMessage, Role};

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PROVIDER: &str = "Gemini";
const KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    /// Run one generateContent call in structured (JSON) output mode.
    pub async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey {
            provider: PROVIDER,
            env_var: KEY_ENV_VAR,
        })?;

        let request = build_request(messages);
        let url = format!(
            "{}/{}:generateContent?key={}",
            API_BASE_URL,
            model,
            urlencoding::encode(api_key)
        );

        let response = self.http.post(&url).json(&request).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LlmError::Auth {
                provider: PROVIDER,
                env_var: KEY_ENV_VAR,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Gemini reports a bad key as a 400 with an API_KEY_INVALID reason.
            if body.contains("API_KEY_INVALID") || body.contains("API key not valid") {
                return Err(LlmError::Auth {
                    provider: PROVIDER,
                    env_var: KEY_ENV_VAR,
                });
            }
            return Err(LlmError::Api {
                provider: PROVIDER,
                message: format!("{}: {}", status, body.trim()),
            });
        }

        let body: GenerateContentResponse =
            response.json().await.map_err(|e| LlmError::MalformedReply {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        let usage = body.usage_metadata.unwrap_or_default();
        let content = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| LlmError::MalformedReply {
                provider: PROVIDER,
                message: "reply contained no candidates".to_string(),
            })?;

        Ok(Completion {
            content,
            usage: TokenUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }
}

/// Split the transcript into a system instruction plus replayed history.
fn build_request(messages: &[ChatMessage]) -> GenerateContentRequest {
    let mut system_instruction = None;
    let mut contents = Vec::new();

    for message in messages {
        match message.role {
            Role::System => {
                system_instruction = Some(Content {
                    role: None,
                    parts: vec![Part {
                        text: message.content.clone(),
                    }],
                });
            }
            Role::User => contents.push(Content {
                role: Some("user"),
                parts: vec![Part {
                    text: message.content.clone(),
                }],
            }),
            Role::Assistant => contents.push(Content {
                role: Some("model"),
                parts: vec![Part {
                    text: message.content.clone(),
                }],
            }),
        }
    }

    GenerateContentRequest {
        system_instruction,
        contents,
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
    }
}
