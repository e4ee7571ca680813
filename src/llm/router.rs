//! Selector-driven routing between backend adapters.

use std::time::Duration;

use async_trait::async_trait;

use super::{Completion, GeminiClient, LlmClient, LlmError, OpenAiClient};
use crate::config::Config;
use crate::ledger::UsageLedger;
use crate::models::{ModelId, ModelSelector};
use crate::protocol::ChatMessage;

/// Routes each call to the backend matching the currently selected model,
/// enforces the per-call timeout, and records usage into the ledger.
pub struct ModelRouter {
    selector: ModelSelector,
    ledger: UsageLedger,
    openai: OpenAiClient,
    gemini: GeminiClient,
    timeout: Duration,
}

impl ModelRouter {
    pub fn new(config: &Config, selector: ModelSelector, ledger: UsageLedger) -> Self {
        Self {
            selector,
            ledger,
            openai: OpenAiClient::new(config.openai_api_key.clone()),
            gemini: GeminiClient::new(config.gemini_api_key.clone()),
            timeout: config.request_timeout,
        }
    }

    async fn dispatch(
        &self,
        model: ModelId,
        messages: &[ChatMessage],
    ) -> Result<Completion, LlmError> {
        match model {
            ModelId::Gpt4oMini => self.openai.complete(model.id(), messages).await,
            ModelId::Gemini25Flash => self.gemini.complete(model.id(), messages).await,
        }
    }
}

#[async_trait]
impl LlmClient for ModelRouter {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        session_id: &str,
    ) -> Result<String, LlmError> {
        let model = self.selector.current().await;
        tracing::debug!(model = model.id(), session = session_id, "model call");

        // Race the request against the timeout. Losing the race drops the
        // request future, which aborts the underlying HTTP call.
        let completion = tokio::time::timeout(self.timeout, self.dispatch(model, messages))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))??;

        self.ledger
            .record(
                session_id,
                model.provider(),
                model.id(),
                completion.usage.input_tokens,
                completion.usage.output_tokens,
            )
            .await;

        Ok(completion.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn missing_credential_surfaces_before_the_network() {
        // No keys configured: the first call must fail with the exact env
        // var to set, and nothing is recorded in the ledger.
        let config = Config::new(PathBuf::from("/tmp"));
        let selector = ModelSelector::new(ModelId::Gpt4oMini);
        let ledger = UsageLedger::new();
        let router = ModelRouter::new(&config, selector.clone(), ledger.clone());

        let err = router
            .complete(&[ChatMessage::system("s")], "session-test")
            .await
            .expect_err("no key configured");
        assert_eq!(err.credential_hint(), Some("OPEN_AI_KEY"));
        assert_eq!(ledger.totals("session-test").await.calls, 0);

        // Switching models changes which credential the router asks for.
        selector.switch(ModelId::Gemini25Flash).await;
        let err = router
            .complete(&[ChatMessage::system("s")], "session-test")
            .await
            .expect_err("no key configured");
        assert_eq!(err.credential_hint(), Some("GEMINI_API_KEY"));
    }
}
