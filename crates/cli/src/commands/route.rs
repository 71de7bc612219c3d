//! `warden route`: dry-run the routing chain for a prompt.
//!
//! No backend is contacted. The classifier is switched off, so the
//! decision comes from the fallback, override or default strategy.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use warden_config::RoutingConfig;
use warden_core::{BackendClient, BackendError};
use warden_routing::{ModelRouter, ModelSession, RoutingContext, RoutingDecision};

use super::load_config;

/// Client for dry runs: every backend is unreachable.
struct OfflineClient;

#[async_trait]
impl BackendClient for OfflineClient {
    async fn generate_json(
        &self,
        backend: &str,
        _prompt: &str,
    ) -> Result<serde_json::Value, BackendError> {
        Err(BackendError::NotConfigured(format!(
            "no live client for backend '{backend}' in a dry run"
        )))
    }
}

pub async fn run(
    explicit: Option<&Path>,
    prompt: Option<String>,
    history: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(explicit).map_err(|e| format!("Failed to load config: {e}"))?;
    let router = dry_run_router(config.routing);
    let context = RoutingContext::new(prompt.unwrap_or_default()).with_history(history);

    let decision = router.route(&context).await;
    println!("{}", render(&router, &decision));
    Ok(())
}

fn dry_run_router(mut routing: RoutingConfig) -> ModelRouter {
    routing.use_classifier = false;
    let session = Arc::new(ModelSession::new("dry-run", routing));
    ModelRouter::new(session, Arc::new(OfflineClient))
}

fn render(router: &ModelRouter, decision: &RoutingDecision) -> String {
    format!(
        "Chain:     {}\nBackend:   {}\nSource:    {}\nLatency:   {}ms\nReasoning: {}",
        router.strategies().join(" -> "),
        decision.backend,
        decision.metadata.source,
        decision.metadata.latency_ms,
        decision.metadata.reasoning,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_config_routes_to_default_backend() {
        let router = dry_run_router(RoutingConfig::default());
        let decision = router.route(&RoutingContext::new("hello")).await;
        assert_eq!(decision.backend, "primary");

        let out = render(&router, &decision);
        assert!(out.contains("fallback -> override -> classifier -> default"));
        assert!(out.contains("Source:    agent-router/default"));
    }

    #[tokio::test]
    async fn pinned_model_is_reported_as_override() {
        let router = dry_run_router(RoutingConfig {
            model: "big-model".into(),
            ..RoutingConfig::default()
        });
        let decision = router.route(&RoutingContext::new("hello")).await;
        assert_eq!(decision.backend, "big-model");
        assert!(render(&router, &decision).contains("agent-router/override"));
    }

    #[tokio::test]
    async fn offline_client_refuses() {
        let err = OfflineClient.generate_json("fast", "x").await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(_)));
    }
}
