//! Per-session usage and cost accounting.
//!
//! Sessions are keyed by an opaque id, created lazily on first reference,
//! and kept in memory for the process lifetime. Records are purely
//! additive; short interactive sessions make unbounded growth acceptable.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::Provider;

/// USD per 1K tokens: (input, output). Models not listed cost zero.
fn pricing_for(model: &str) -> (f64, f64) {
    match model {
        "gpt-4o-mini" => (0.15, 0.60),
        _ => (0.0, 0.0),
    }
}

/// Usage of a single model call.
#[derive(Debug, Clone)]
pub struct CallRecord {
    pub provider: Provider,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

/// Accumulated usage for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionTotals {
    pub calls: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub items: Vec<CallRecord>,
}

/// In-memory usage ledger shared between the router and the shell.
#[derive(Debug, Clone, Default)]
pub struct UsageLedger {
    sessions: Arc<RwLock<HashMap<String, SessionTotals>>>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one model call against a session.
    pub async fn record(
        &self,
        session_id: &str,
        provider: Provider,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) {
        let (input_price, output_price) = pricing_for(model);
        let cost_usd = (input_tokens as f64 / 1000.0) * input_price
            + (output_tokens as f64 / 1000.0) * output_price;

        let mut sessions = self.sessions.write().await;
        let totals = sessions.entry(session_id.to_string()).or_default();
        totals.calls += 1;
        totals.input_tokens += input_tokens;
        totals.output_tokens += output_tokens;
        totals.cost_usd += cost_usd;
        totals.items.push(CallRecord {
            provider,
            model: model.to_string(),
            input_tokens,
            output_tokens,
            cost_usd,
        });
    }

    /// Totals for a session, creating an empty record on first reference.
    pub async fn totals(&self, session_id: &str) -> SessionTotals {
        let mut sessions = self.sessions.write().await;
        sessions.entry(session_id.to_string()).or_default().clone()
    }

    /// The most recent call recorded for a session, if any.
    pub async fn last_call(&self, session_id: &str) -> Option<CallRecord> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .and_then(|totals| totals.items.last().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_accumulate_per_session() {
        let ledger = UsageLedger::new();
        ledger
            .record("s1", Provider::OpenAi, "gpt-4o-mini", 1000, 2000)
            .await;
        ledger
            .record("s1", Provider::Google, "gemini-2.5-flash", 0, 0)
            .await;
        ledger
            .record("s2", Provider::OpenAi, "gpt-4o-mini", 10, 10)
            .await;

        let totals = ledger.totals("s1").await;
        assert_eq!(totals.calls, 2);
        assert_eq!(totals.input_tokens, 1000);
        assert_eq!(totals.output_tokens, 2000);
        assert_eq!(totals.items.len(), 2);

        let other = ledger.totals("s2").await;
        assert_eq!(other.calls, 1);
    }

    #[tokio::test]
    async fn cost_uses_per_thousand_pricing() {
        let ledger = UsageLedger::new();
        ledger
            .record("s", Provider::OpenAi, "gpt-4o-mini", 1000, 1000)
            .await;
        let totals = ledger.totals("s").await;
        assert!((totals.cost_usd - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn unknown_models_cost_nothing() {
        let ledger = UsageLedger::new();
        ledger
            .record("s", Provider::Google, "gemini-2.5-flash", 5000, 5000)
            .await;
        assert_eq!(ledger.totals("s").await.cost_usd, 0.0);
    }

    #[tokio::test]
    async fn totals_creates_sessions_lazily() {
        let ledger = UsageLedger::new();
        let totals = ledger.totals("fresh").await;
        assert_eq!(totals.calls, 0);
        assert!(totals.items.is_empty());
        assert!(ledger.last_call("fresh").await.is_none());
    }
}
