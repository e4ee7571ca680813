//! Model catalog and the shared current-model selector.
//!
//! The selector is a cheap-to-clone handle created once in `main` and handed
//! to every consumer that needs the active model (the shell for display, the
//! router for dispatch). Switching through any handle affects all subsequent
//! calls for every session sharing it.

use std::sync::Arc;

use tokio::sync::RwLock;

/// The backend a model is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Google,
}

impl Provider {
    /// Human-readable provider label.
    pub fn label(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Google => "Gemini",
        }
    }
}

/// A model the router knows how to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelId {
    Gpt4oMini,
    Gemini25Flash,
}

impl ModelId {
    /// Every model in the catalog, in picker order.
    pub const ALL: &'static [ModelId] = &[ModelId::Gpt4oMini, ModelId::Gemini25Flash];

    /// Stable wire identifier (also what the picker accepts as text input).
    pub fn id(&self) -> &'static str {
        match self {
            ModelId::Gpt4oMini => "gpt-4o-mini",
            ModelId::Gemini25Flash => "gemini-2.5-flash",
        }
    }

    /// Display name for banners and the picker.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::Gpt4oMini => "GPT-4o Mini",
            ModelId::Gemini25Flash => "Gemini 2.5 Flash",
        }
    }

    /// One-line description shown in the model picker.
    pub fn description(&self) -> &'static str {
        match self {
            ModelId::Gpt4oMini => "Fast and efficient OpenAI model",
            ModelId::Gemini25Flash => "Google's latest flash model",
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ModelId::Gpt4oMini => Provider::OpenAi,
            ModelId::Gemini25Flash => Provider::Google,
        }
    }

    /// Parse a wire identifier back into a catalog entry.
    pub fn parse(s: &str) -> Option<ModelId> {
        ModelId::ALL.iter().copied().find(|m| m.id() == s)
    }
}

/// Shared handle to the currently active model.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    current: Arc<RwLock<ModelId>>,
}

impl ModelSelector {
    pub fn new(initial: ModelId) -> Self {
        Self {
            current: Arc::new(RwLock::new(initial)),
        }
    }

    /// The model subsequent calls will be routed to.
    pub async fn current(&self) -> ModelId {
        *self.current.read().await
    }

    /// Switch the active model.
    ///
    /// Returns whether the selection actually changed; reselecting the
    /// active model is a no-op.
    pub async fn switch(&self, model: ModelId) -> bool {
        let mut current = self.current.write().await;
        if *current == model {
            false
        } else {
            *current = model;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_catalog_ids() {
        for model in ModelId::ALL {
            assert_eq!(ModelId::parse(model.id()), Some(*model));
        }
        assert_eq!(ModelId::parse("gpt-5"), None);
    }

    #[tokio::test]
    async fn switch_changes_and_reselect_is_noop() {
        let selector = ModelSelector::new(ModelId::Gpt4oMini);
        assert_eq!(selector.current().await, ModelId::Gpt4oMini);

        assert!(selector.switch(ModelId::Gemini25Flash).await);
        assert_eq!(selector.current().await, ModelId::Gemini25Flash);

        // Reselecting the active model reports no change.
        assert!(!selector.switch(ModelId::Gemini25Flash).await);
        assert_eq!(selector.current().await, ModelId::Gemini25Flash);
    }

    #[tokio::test]
    async fn clones_share_the_selection() {
        let selector = ModelSelector::new(ModelId::Gpt4oMini);
        let other = selector.clone();
        selector.switch(ModelId::Gemini25Flash).await;
        assert_eq!(other.current().await, ModelId::Gemini25Flash);
    }
}
