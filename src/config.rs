//! Configuration management for Codex AI.
//!
//! Configuration is read from environment variables (a local `.env` file is
//! loaded first when present):
//! - `OPEN_AI_KEY` - API key for the OpenAI backend.
//! - `GEMINI_API_KEY` - API key for the Gemini backend.
//! - `CODEX_DEFAULT_MODEL` - Optional. Model active at startup. Defaults to `gpt-4o-mini`.
//! - `CODEX_MAX_STEPS` - Optional. Maximum protocol steps per query. Defaults to `50`.
//! - `CODEX_REQUEST_TIMEOUT_SECS` - Optional. Per-call model timeout. Defaults to `30`.
//! - `WORKSPACE_PATH` - Optional. Directory tools operate in. Defaults to the current directory.
//!
//! Provider keys are optional at startup: a missing key fails the first call
//! that actually needs it with an actionable message, so the shell can start
//! and the user can still switch to the other backend.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::models::ModelId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key (`OPEN_AI_KEY`), if set
    pub openai_api_key: Option<String>,

    /// Gemini API key (`GEMINI_API_KEY`), if set
    pub gemini_api_key: Option<String>,

    /// Model active at startup
    pub default_model: ModelId,

    /// Maximum protocol steps per query before the loop gives up
    pub max_steps: usize,

    /// Upper bound on a single model call
    pub request_timeout: Duration,

    /// Workspace directory for file, shell, and scaffold operations
    pub workspace_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a numeric or model-name
    /// variable is set to something unparseable. Missing provider keys are
    /// not an error here.
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = std::env::var("OPEN_AI_KEY").ok().filter(|k| !k.is_empty());
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let default_model = match std::env::var("CODEX_DEFAULT_MODEL") {
            Ok(name) => ModelId::parse(&name)
                .ok_or_else(|| ConfigError::InvalidValue("CODEX_DEFAULT_MODEL".to_string(), name))?,
            Err(_) => ModelId::Gpt4oMini,
        };

        let max_steps = std::env::var("CODEX_MAX_STEPS")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("CODEX_MAX_STEPS".to_string(), format!("{}", e)))?;

        let timeout_secs: u64 = std::env::var("CODEX_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("CODEX_REQUEST_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;

        let workspace_path = std::env::var("WORKSPACE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        Ok(Self {
            openai_api_key,
            gemini_api_key,
            default_model,
            max_steps,
            request_timeout: Duration::from_secs(timeout_secs),
            workspace_path,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(workspace_path: PathBuf) -> Self {
        Self {
            openai_api_key: None,
            gemini_api_key: None,
            default_model: ModelId::Gpt4oMini,
            max_steps: 50,
            request_timeout: Duration::from_secs(30),
            workspace_path,
        }
    }
}
