//! LLM backends and routing.
//!
//! Both providers are normalized behind a single contract: send the full
//! transcript, get back one raw assistant reply string (expected to be the
//! JSON of a protocol step). The router picks the backend from the shared
//! model selector on every call.

mod gemini;
mod openai;
mod router;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use router::ModelRouter;

use async_trait::async_trait;
use thiserror::Error;

use crate::protocol::ChatMessage;

/// Token usage reported by a backend for one call. Zero-filled when the
/// provider does not expose counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// One completed chat call: raw assistant content plus usage.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

/// Model call failures, split so callers can print targeted remediation
/// for credential problems without string-matching provider text.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured for {provider}: set {env_var} in your environment or .env file")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("{provider} rejected the configured credentials (check {env_var})")]
    Auth {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("model call timed out after {0} seconds")]
    Timeout(u64),

    #[error("{provider} request failed: {message}")]
    Api {
        provider: &'static str,
        message: String,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed reply from {provider}: {message}")]
    MalformedReply {
        provider: &'static str,
        message: String,
    },
}

impl LlmError {
    /// For credential/configuration failures, the environment variable the
    /// user should set to fix them.
    pub fn credential_hint(&self) -> Option<&'static str> {
        match self {
            LlmError::MissingApiKey { env_var, .. } | LlmError::Auth { env_var, .. } => {
                Some(env_var)
            }
            _ => None,
        }
    }
}

/// The uniform model-call contract the agent loop depends on.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the transcript, return the raw assistant reply content.
    /// Implementations record usage against `session_id`.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        session_id: &str,
    ) -> Result<String, LlmError>;
}
